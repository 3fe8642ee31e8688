use super::params::CorrectionParameters;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

static PM6_D3H4: OnceLock<CorrectionParameters> = OnceLock::new();

/// Published parameterizations shipped with the library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    #[default]
    Pm6D3H4,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown correction method '{0}' (available: pm6-d3h4)")]
pub struct UnknownMethodError(pub String);

impl Method {
    pub const ALL: [Method; 1] = [Method::Pm6D3H4];

    pub fn name(self) -> &'static str {
        match self {
            Method::Pm6D3H4 => "pm6-d3h4",
        }
    }

    /// The parameter set of this method, parsed once from the embedded resource.
    pub fn parameters(self) -> &'static CorrectionParameters {
        match self {
            Method::Pm6D3H4 => PM6_D3H4.get_or_init(|| {
                const PM6_D3H4_TOML: &str = include_str!("../../../resources/pm6-d3h4.toml");
                CorrectionParameters::from_toml_str(PM6_D3H4_TOML)
                    .expect("Failed to parse embedded PM6-D3H4 parameters. This is a library bug.")
            }),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Method {
    type Err = UnknownMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "pm6-d3h4" | "d3h4" => Ok(Method::Pm6D3H4),
            _ => Err(UnknownMethodError(s.to_string())),
        }
    }
}
