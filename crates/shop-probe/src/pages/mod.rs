//! Admin page objects.

pub mod taxon_create;

pub use taxon_create::TaxonCreatePage;
