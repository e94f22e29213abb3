//! # Parameter Enumeration Adapter
//!
//! ## Purpose
//!
//! Turns a densely-numbered parameter enumeration into the binding
//! descriptors of a configuration table. Ids run from a `Start` sentinel to
//! an `End` sentinel; every id strictly between them is one parameter with a
//! name and a type tag (`"int"` or `"str"`).
//!
//! ```text
//!   id:     Start   1      2      3     End
//!           ─────┬──────┬──────┬──────┬─────
//!   binding:     │  0   │  1   │  2   │
//!   slot:        │  1   │  2   │  3   │
//! ```
//!
//! Bindings are indexed from zero ([`binding_index`]) while table slots are
//! indexed by the id itself, leaving slot `Start` unused.
//!
//! ## Enumeration sources
//!
//! - [`param_enum!`](crate::param_enum): compile-time enum with sentinels
//! - [`ParamList`]: runtime list parsed from `NAME:TYPE` pairs

use std::fmt;
use std::str::FromStr;

use codec::{Binding, ScanError};
use tracing::{debug, error};
use types::{ParamType, SlotRef, MAX_KEY_LEN};

use crate::error::{ConfigError, ConfigResult};
use crate::settings::IniTableSettings;

/// A densely-numbered set of named, typed parameters
pub trait ParamEnum {
    /// Sentinel before the first parameter
    fn start(&self) -> u16 {
        0
    }

    /// Sentinel after the last parameter
    fn end(&self) -> u16;

    fn name_of(&self, id: u16) -> Option<&str>;

    /// Raw type tag for `id`
    fn type_of(&self, id: u16) -> Option<&str>;

    /// Number of parameters between the sentinels
    fn param_count(&self) -> usize {
        usize::from(self.end().saturating_sub(self.start())).saturating_sub(1)
    }

    /// Ids strictly between the sentinels
    fn ids(&self) -> std::ops::Range<u16> {
        self.start().saturating_add(1)..self.end()
    }
}

/// Zero-based binding position of parameter `id`
///
/// `None` when `id` is at or before the start sentinel.
pub const fn binding_index(start: u16, id: u16) -> Option<usize> {
    if id > start {
        Some((id - start - 1) as usize)
    } else {
        None
    }
}

/// Names and tags of a compile-time enumeration, in id order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticParams {
    names: &'static [&'static str],
    types: &'static [&'static str],
}

impl StaticParams {
    pub const fn new(names: &'static [&'static str], types: &'static [&'static str]) -> Self {
        assert!(names.len() == types.len(), "every parameter needs a type tag");
        Self { names, types }
    }
}

impl ParamEnum for StaticParams {
    fn end(&self) -> u16 {
        u16::try_from(self.names.len()).map_or(u16::MAX, |n| n.saturating_add(1))
    }

    fn name_of(&self, id: u16) -> Option<&str> {
        binding_index(self.start(), id).and_then(|i| self.names.get(i).copied())
    }

    fn type_of(&self, id: u16) -> Option<&str> {
        binding_index(self.start(), id).and_then(|i| self.types.get(i).copied())
    }
}

/// Declare a parameter enumeration
///
/// Generates a `#[repr(u16)]` enum with `Start = 0` and `End` sentinels
/// around the listed parameters, and a `PARAMS` constant usable wherever a
/// [`ParamEnum`] is expected.
///
/// ```
/// initbl::param_enum! {
///     pub enum AppParam {
///         Port: int,
///         Name: str,
///     }
/// }
///
/// use initbl::ParamEnum;
/// assert_eq!(AppParam::Port.id(), 1);
/// assert_eq!(AppParam::End as u16, 3);
/// assert_eq!(AppParam::PARAMS.name_of(2), Some("Name"));
/// ```
#[macro_export]
macro_rules! param_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($param:ident : $tag:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(u16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis enum $name {
            Start = 0,
            $($param,)+
            End,
        }

        impl $name {
            /// Names and type tags in id order
            pub const PARAMS: $crate::StaticParams = $crate::StaticParams::new(
                &[$(stringify!($param)),+],
                &[$(stringify!($tag)),+],
            );

            pub const fn id(self) -> u16 {
                self as u16
            }
        }

        impl From<$name> for u16 {
            fn from(param: $name) -> u16 {
                param as u16
            }
        }
    };
}

/// One `NAME:TYPE` entry of a runtime parameter list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: String,
    pub tag: String,
}

impl FromStr for ParamSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, tag) = s
            .split_once(':')
            .ok_or_else(|| format!("expected NAME:TYPE, got '{s}'"))?;
        if name.is_empty() {
            return Err(format!("empty parameter name in '{s}'"));
        }
        Ok(Self {
            name: name.to_string(),
            tag: tag.to_string(),
        })
    }
}

impl fmt::Display for ParamSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.tag)
    }
}

/// Parameter enumeration assembled at runtime; ids start at 1
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamList {
    specs: Vec<ParamSpec>,
}

impl ParamList {
    pub fn new(specs: Vec<ParamSpec>) -> Self {
        Self { specs }
    }

    /// Append a parameter and return its id
    pub fn push(&mut self, name: impl Into<String>, param_type: ParamType) -> u16 {
        self.specs.push(ParamSpec {
            name: name.into(),
            tag: param_type.tag().to_string(),
        });
        self.end() - 1
    }

    /// Id of the parameter called `name`
    pub fn id_of(&self, name: &str) -> Option<u16> {
        self.specs
            .iter()
            .position(|spec| spec.name == name)
            .map(|i| i as u16 + self.start() + 1)
    }

    pub fn specs(&self) -> &[ParamSpec] {
        &self.specs
    }
}

impl ParamEnum for ParamList {
    fn end(&self) -> u16 {
        u16::try_from(self.specs.len()).map_or(u16::MAX, |n| n.saturating_add(1))
    }

    fn name_of(&self, id: u16) -> Option<&str> {
        binding_index(self.start(), id)
            .and_then(|i| self.specs.get(i))
            .map(|spec| spec.name.as_str())
    }

    fn type_of(&self, id: u16) -> Option<&str> {
        binding_index(self.start(), id)
            .and_then(|i| self.specs.get(i))
            .map(|spec| spec.tag.as_str())
    }
}

impl FromIterator<ParamSpec> for ParamList {
    fn from_iter<I: IntoIterator<Item = ParamSpec>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// A validated parameter: id, name and declared type
#[derive(Debug, Clone)]
pub struct ParamInfo {
    pub id: u16,
    pub name: String,
    pub param_type: ParamType,
}

/// Build one descriptor per parameter
///
/// Either every descriptor is built or none is: the first bad parameter
/// aborts the build.
pub fn build_bindings<P>(
    params: &P,
    settings: &IniTableSettings,
) -> ConfigResult<(Vec<Binding>, Vec<ParamInfo>)>
where
    P: ParamEnum + ?Sized,
{
    let count = params.param_count();
    if count > settings.max_items {
        error!(
            count,
            max = settings.max_items,
            "parameter enumeration exceeds table capacity"
        );
        return Err(ConfigError::TooManyParameters {
            count,
            max: settings.max_items,
        });
    }

    let mut bindings = Vec::with_capacity(count);
    let mut infos = Vec::with_capacity(count);

    for id in params.ids() {
        let name = params.name_of(id).ok_or_else(|| {
            error!(id, "parameter has no name");
            ConfigError::UnnamedParameter { id }
        })?;
        let tag = params.type_of(id).unwrap_or_default();

        let param_type = ParamType::from_tag(tag).ok_or_else(|| {
            error!(id, name, tag, "unknown parameter type tag");
            ConfigError::UnknownParameterType {
                id,
                name: name.to_string(),
                tag: tag.to_string(),
            }
        })?;

        let binding = Binding::namespaced(
            &settings.namespace_prefix,
            name,
            param_type.json_type(),
            SlotRef(usize::from(id)),
            param_type.slot_capacity(settings.max_str_len),
        )
        .map_err(|err| {
            let len = match err {
                ScanError::KeyInvalid { len, .. } => len,
                _ => settings.namespace_prefix.len() + name.len(),
            };
            error!(id, name, len, max = MAX_KEY_LEN, "query key too long");
            ConfigError::KeyTooLong {
                name: name.to_string(),
                len,
                max: MAX_KEY_LEN,
            }
        })?;

        debug!(
            id,
            key = binding.key(),
            param_type = %param_type,
            capacity = binding.capacity(),
            "parameter binding built"
        );

        bindings.push(binding);
        infos.push(ParamInfo {
            id,
            name: name.to_string(),
            param_type,
        });
    }

    Ok((bindings, infos))
}
