//! Placeholder expansion for decoded configuration trees.
//!
//! Rewrites every string in a [`Value`] tree, substituting `${NAME}`
//! references with values from a [`Resolver`]:
//!
//! - `${VAR}` - value of VAR, error if not found
//! - `${VAR:-default}` - value of VAR, otherwise `default` (may be empty)
//! - `${VAR:number}` / `${VAR:boolean}` / `${VAR:string}` - coerce the value
//! - `${VAR:number:-8080}` - format and fallback combined
//! - `\${VAR}` - escaped, emitted as `${VAR}` without lookup
//!
//! A string that is exactly one placeholder takes the coerced type
//! (`"${PORT:number}"` becomes an integer). Placeholders surrounded by other
//! text are rendered back into the string.
//!
//! Expansion never stops at the first problem: every failing placeholder is
//! left as written and reported, and the best-effort tree is always returned.
//!
//! ```
//! use expandenv_core::{EnvResolver, Value, expand};
//!
//! let env = EnvResolver::from_vars([("HOST", "example.com")]);
//! let config: Value = serde_yaml::from_str("url: https://${HOST}/api\nport: ${PORT:number:-443}")?;
//!
//! let expansion = expand(&config, &env);
//! assert!(expansion.is_complete());
//! assert_eq!(expansion.value.get("url"), Some(&Value::from("https://example.com/api")));
//! assert_eq!(expansion.value.get("port"), Some(&Value::Integer(443)));
//! # Ok::<(), serde_yaml::Error>(())
//! ```

pub mod document;
mod error;
mod expand;
pub mod placeholder;
pub mod resolver;
mod value;

pub use error::{ExpandError, ExpandErrors, VariableScope};
pub use expand::{Expansion, expand, expand_env, expand_map, expand_str, expand_with};
pub use placeholder::{Format, Placeholder};
pub use resolver::{Chain, EnvResolver, FnResolver, Resolved, Resolver};
pub use value::Value;
