pub mod alerts;
pub mod audit;
pub mod documents;
pub mod enrich;
pub mod fields;
pub mod inventory;
pub mod registrations;
pub mod reports;
pub mod seedgen;
pub mod users;
