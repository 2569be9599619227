//! The configuration keys recognised by the heuristic engine.
//!
//! Configuration *loading* is the caller's concern; the engine only consumes a key/value map
//! with the entries below.
//!
//! | Key | Effect |
//! |---|---|
//! | `heuristic.variant` | `direct_crpg`, `direct_hmax`, or `unreached_atom` |
//! | `heuristic.use_min_hmax_value_selector` | goal witnesses prefer values with low layer index |
//! | `rpg.max_layers` | safety cap on the layer count; exceeded means unreachable |

use std::str::FromStr;

use crate::error::OptionsError;
use crate::rpg::LayerIndex;

/// Which heuristic the engine should construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeuristicVariant {
    /// Action-centric expansion scored by relaxed-plan cost.
    #[default]
    DirectCrpg,
    /// Action-centric expansion scored by the first goal layer.
    DirectHmax,
    /// Atom-centric expansion with per-effect constraint problems.
    UnreachedAtom,
}

impl FromStr for HeuristicVariant {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "direct_crpg" => Ok(HeuristicVariant::DirectCrpg),
            "direct_hmax" => Ok(HeuristicVariant::DirectHmax),
            "unreached_atom" => Ok(HeuristicVariant::UnreachedAtom),
            _ => Err(()),
        }
    }
}

/// The options recognised by the heuristic engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeuristicOptions {
    pub variant: HeuristicVariant,
    /// When true, the goal CSP tries candidate values in order of their first-achieving layer
    /// (ties broken by atom index) instead of ascending value order.
    pub use_min_hmax_value_selector: bool,
    /// Safety cap on the number of layers built per evaluation. Exceeding it is reported as
    /// unreachable, with a log record.
    pub max_layers: Option<LayerIndex>,
}

impl HeuristicOptions {
    /// Read the options from a key/value map. Unrecognised keys and unparsable values are
    /// rejected.
    pub fn from_key_values<'a>(
        entries: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<HeuristicOptions, OptionsError> {
        let mut options = HeuristicOptions::default();
        for (key, value) in entries {
            let invalid = || OptionsError::InvalidValue {
                key: key.to_owned(),
                value: value.to_owned(),
            };
            match key {
                "heuristic.variant" => {
                    options.variant = value.parse().map_err(|()| invalid())?;
                }
                "heuristic.use_min_hmax_value_selector" => {
                    options.use_min_hmax_value_selector =
                        value.parse().map_err(|_| invalid())?;
                }
                "rpg.max_layers" => {
                    options.max_layers = Some(value.parse().map_err(|_| invalid())?);
                }
                _ => return Err(OptionsError::UnrecognisedKey(key.to_owned())),
            }
        }
        Ok(options)
    }
}
