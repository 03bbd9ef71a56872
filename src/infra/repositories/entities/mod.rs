//! sea-orm table models. Repositories convert them into domain records.

pub mod offboarding_case;
pub mod user;
