pub mod beneficiaire;
pub mod document;
pub mod dossier;
pub mod group;
pub mod journal;
pub mod liasse;
pub mod localisation;
pub mod options;
pub mod serie;
pub mod structure;
pub mod type_document;
pub mod user;

pub use beneficiaire::Beneficiaire;
pub use document::Document;
pub use dossier::Dossier;
pub use group::Group;
pub use journal::JournalEntry;
pub use liasse::Liasse;
pub use localisation::Localisation;
pub use options::Setting;
pub use serie::Serie;
pub use structure::Structure;
pub use type_document::TypeDocument;
pub use user::User;
