// Item store types: records, change-feed events and the profile model.
//
// The item store itself is an external collaborator; this module only
// describes what comes out of its change feed and what we write to it.

pub mod models;
pub mod stream;
