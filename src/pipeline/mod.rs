// Event handlers: each one stateless and independently invoked.
//
// change_feed: item inserts -> notifications
// subscribe:   create-or-update a subscriber's category filter
// confirmation: default group + profile on account confirmation
// admin:       promote a user to a named group

pub mod admin;
pub mod change_feed;
pub mod confirmation;
pub mod subscribe;
