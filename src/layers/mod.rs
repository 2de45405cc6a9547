//! Layer file loading.
//!
//! Layer files use a permissive JSON superset: `//` and `/* */` comments,
//! trailing commas before `}`/`]`, and bare identifier keys. A reserved
//! top-level `$include` key (a path or list of paths, relative to the
//! containing file) pulls other layers in underneath the file's own keys.
//!
//! ```text
//! {
//!   // shared defaults live next door
//!   $include: ["./base.json5", "./channels.json5"],
//!   gateway: { auth: { token: "${GATEWAY_TOKEN}" }, },
//! }
//! ```

mod dialect;
mod include;


pub use dialect::{ParsedLayer, parse_layer, to_strict_json};
pub use include::{INCLUDE_KEY, load_layer};
