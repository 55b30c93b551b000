pub mod anthropic;
pub(crate) mod anthropic_translate;
pub(crate) mod translator_contract;
