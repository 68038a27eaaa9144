use crate::commands::print_json;
use crate::error::invalid_input;
use anyhow::Result;
use chatlink_core::{generate_variations, VariationSet};
use clap::Args;
use std::collections::BTreeMap;

#[derive(Debug, Args)]
pub struct VariationsArgs {
    #[arg(required = true)]
    pub phones: Vec<String>,
}

pub fn print_variations(json: bool, args: VariationsArgs) -> Result<()> {
    let mut out: BTreeMap<String, VariationSet> = BTreeMap::new();
    for phone in args.phones {
        let variations = generate_variations(&phone)
            .map_err(|err| invalid_input(format!("{phone:?}: {err}")))?;
        out.insert(phone, variations);
    }

    if json {
        return print_json(&out);
    }

    for (phone, variations) in &out {
        println!("{phone} ({} variations)", variations.len());
        for value in variations {
            println!("  {value}");
        }
    }
    Ok(())
}
