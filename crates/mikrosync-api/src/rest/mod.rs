// RouterOS REST client modules
//
// `client` holds transport mechanics (URL construction, auth, response
// decoding); `commands` implements `RouterApi` on top of it.

pub mod client;
mod commands;

pub use client::RestClient;
