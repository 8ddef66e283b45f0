#![doc = include_str!("../README.md")]

mod collection;
mod document;
mod error;
mod link;
mod props;
mod resource;
mod state;

pub mod v1 {
    //! Versioned public API for hypermedia resources.
    //!
    //! Everything you need is re-exported from this module. Types are
    //! organized into four groups:
    //!
    //! # Resources
    //!
    //! - [`Resource`] — identity, nested properties, links, state, embedded children
    //! - [`Collection`] — a resource wrapping an ordered item list and [`Pagination`]
    //! - [`Document`] — either of the above, as handed to renderers
    //!
    //! # Links
    //!
    //! - [`Link`] — one typed hyperlink
    //! - [`LinkOptions`] — optional link attributes (`templated`, `title`, …)
    //! - [`LinkEntry`] — the single link or list of links under a relation
    //! - [`LinkManager`] — relation → links registry
    //!
    //! # State
    //!
    //! - [`ResourceState`] — current state plus the transition table
    //! - [`Transition`] — a named, optionally guarded edge
    //! - [`Condition`] — a guard on one property
    //!
    //! # Errors
    //!
    //! - [`Error`] — invalid arguments, illegal transitions, negotiation failures
    //! - [`NegotiationCode`] — reason attached to negotiation failures
    //!
    //! # Example — an order moving through its lifecycle
    //!
    //! ```
    //! use hateoas::v1::*;
    //!
    //! let mut order = Resource::new("order", 7).with_state("pending");
    //! order.set_property("total", 19.99).unwrap();
    //! order.add_link("self", "/orders/7").unwrap();
    //! order
    //!     .add_transition(Transition::new("pending", "paid", "pay", "/orders/7/pay").unwrap())
    //!     .unwrap();
    //! order
    //!     .add_transition(
    //!         Transition::new("paid", "shipped", "ship", "/orders/7/ship")
    //!             .unwrap()
    //!             .with_condition("address", Condition::present()),
    //!     )
    //!     .unwrap();
    //!
    //! order.apply_transition("pay").unwrap();
    //! assert_eq!(order.state(), "paid");
    //!
    //! // `ship` needs an address first.
    //! assert!(order.apply_transition("ship").is_err());
    //! order.set_property("address.city", "Oslo").unwrap();
    //! order.apply_transition("ship").unwrap();
    //!
    //! let json = order.to_json();
    //! assert_eq!(json["_state"], "shipped");
    //! assert_eq!(json["properties"]["address"]["city"], "Oslo");
    //! ```

    pub use crate::collection::{
        Collection, DEFAULT_COLLECTION_NAME, DEFAULT_COLLECTION_TYPE, DEFAULT_PAGE_SIZE,
        Pagination,
    };
    pub use crate::document::Document;
    pub use crate::error::{Error, NegotiationCode, Result};
    pub use crate::link::{Link, LinkEntry, LinkManager, LinkOptions};
    pub use crate::resource::Resource;
    pub use crate::state::{Condition, ResourceState, Transition};
}
