//! Identity claims extraction shared by Locasso services.
//!
//! Turns whatever identity evidence a request carries (platform proxy headers, an
//! identity token, developer parameters or an upstream principal) into one normalized
//! [`identity::ExternalIdentity`]. Nothing here touches storage.

pub mod developer;
pub mod identity;
pub mod mask;
pub mod principal;
pub mod proxy;
pub mod token;
