pub mod contact;
pub mod number;
pub mod phone;
pub mod variation;

pub use contact::CrmContact;
pub use number::{country_for_calling_code, ParsedNumber};
pub use phone::digits_only;
pub use variation::VariationSet;
