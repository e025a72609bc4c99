//! The call surface course content sees.
//!
//! Both API generations expose the same eight operations under different
//! names. [`RuntimeApi`] is the version-neutral capability; [`ApiStandard`]
//! maps standardized method names onto it.

/// String sentinel for a successful boolean outcome.
pub const TRUE: &str = "true";

/// Value of the `version` property authoring tools probe for.
pub const API_VERSION: &str = "1.0";

/// A run-time API generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiStandard {
    /// SCORM 1.2, published as `API`
    Scorm12,
    /// SCORM 2004, published as `API_1484_11`
    Scorm2004,
}

/// The eight operations every generation offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiMethod {
    /// Start the session
    Initialize,
    /// End the session
    Terminate,
    /// Read a field
    GetValue,
    /// Write a field
    SetValue,
    /// Flush state
    Commit,
    /// Last error code
    GetLastError,
    /// Describe an error code
    GetErrorString,
    /// Diagnostic for an error code
    GetDiagnostic,
}

impl ApiMethod {
    /// Every operation.
    pub const ALL: [ApiMethod; 8] = [
        ApiMethod::Initialize,
        ApiMethod::Terminate,
        ApiMethod::GetValue,
        ApiMethod::SetValue,
        ApiMethod::Commit,
        ApiMethod::GetLastError,
        ApiMethod::GetErrorString,
        ApiMethod::GetDiagnostic,
    ];
}

impl ApiStandard {
    /// Name under which content looks the API up.
    pub fn global_name(self) -> &'static str {
        match self {
            ApiStandard::Scorm12 => "API",
            ApiStandard::Scorm2004 => "API_1484_11",
        }
    }

    /// Standardized name of an operation.
    pub fn method_name(self, method: ApiMethod) -> &'static str {
        match (self, method) {
            (ApiStandard::Scorm12, ApiMethod::Initialize) => "LMSInitialize",
            (ApiStandard::Scorm12, ApiMethod::Terminate) => "LMSFinish",
            (ApiStandard::Scorm12, ApiMethod::GetValue) => "LMSGetValue",
            (ApiStandard::Scorm12, ApiMethod::SetValue) => "LMSSetValue",
            (ApiStandard::Scorm12, ApiMethod::Commit) => "LMSCommit",
            (ApiStandard::Scorm12, ApiMethod::GetLastError) => "LMSGetLastError",
            (ApiStandard::Scorm12, ApiMethod::GetErrorString) => "LMSGetErrorString",
            (ApiStandard::Scorm12, ApiMethod::GetDiagnostic) => "LMSGetDiagnostic",
            (ApiStandard::Scorm2004, ApiMethod::Initialize) => "Initialize",
            (ApiStandard::Scorm2004, ApiMethod::Terminate) => "Terminate",
            (ApiStandard::Scorm2004, ApiMethod::GetValue) => "GetValue",
            (ApiStandard::Scorm2004, ApiMethod::SetValue) => "SetValue",
            (ApiStandard::Scorm2004, ApiMethod::Commit) => "Commit",
            (ApiStandard::Scorm2004, ApiMethod::GetLastError) => "GetLastError",
            (ApiStandard::Scorm2004, ApiMethod::GetErrorString) => "GetErrorString",
            (ApiStandard::Scorm2004, ApiMethod::GetDiagnostic) => "GetDiagnostic",
        }
    }

    /// Resolve a standardized method name.
    pub fn resolve(self, name: &str) -> Option<ApiMethod> {
        ApiMethod::ALL
            .into_iter()
            .find(|m| self.method_name(*m) == name)
    }
}

impl std::fmt::Display for ApiStandard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiStandard::Scorm12 => write!(f, "1.2"),
            ApiStandard::Scorm2004 => write!(f, "2004"),
        }
    }
}

impl std::str::FromStr for ApiStandard {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1.2" | "API" => Ok(ApiStandard::Scorm12),
            "2004" | "API_1484_11" => Ok(ApiStandard::Scorm2004),
            other => Err(format!("unknown API standard: {}", other)),
        }
    }
}

/// A run-time API instance as seen by course content.
///
/// Every method returns a string; boolean outcomes are always [`TRUE`].
pub trait RuntimeApi: Send + Sync {
    /// Which generation this instance speaks.
    fn standard(&self) -> ApiStandard;

    /// The `version` property.
    fn version(&self) -> &'static str {
        API_VERSION
    }

    /// Start the session.
    fn initialize(&self, param: &str) -> String;

    /// End the session.
    fn terminate(&self, param: &str) -> String;

    /// Read a data-model field.
    fn get_value(&self, element: &str) -> String;

    /// Write a data-model field.
    fn set_value(&self, element: &str, value: &str) -> String;

    /// Flush current state to observers.
    fn commit(&self, param: &str) -> String;

    /// Code of the last error.
    fn get_last_error(&self) -> String;

    /// Description of an error code.
    fn get_error_string(&self, code: &str) -> String;

    /// Diagnostic for an error code.
    fn get_diagnostic(&self, code: &str) -> String;

    /// Call an operation by its standardized name, as a scripting bridge
    /// would. Missing arguments are passed as empty strings. Returns `None`
    /// for names this generation does not define.
    fn invoke(&self, method: &str, args: &[&str]) -> Option<String> {
        let arg = |i: usize| args.get(i).copied().unwrap_or("");
        let result = match self.standard().resolve(method)? {
            ApiMethod::Initialize => self.initialize(arg(0)),
            ApiMethod::Terminate => self.terminate(arg(0)),
            ApiMethod::GetValue => self.get_value(arg(0)),
            ApiMethod::SetValue => self.set_value(arg(0), arg(1)),
            ApiMethod::Commit => self.commit(arg(0)),
            ApiMethod::GetLastError => self.get_last_error(),
            ApiMethod::GetErrorString => self.get_error_string(arg(0)),
            ApiMethod::GetDiagnostic => self.get_diagnostic(arg(0)),
        };
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_names_resolve_per_standard() {
        for method in ApiMethod::ALL {
            for standard in [ApiStandard::Scorm12, ApiStandard::Scorm2004] {
                assert_eq!(standard.resolve(standard.method_name(method)), Some(method));
            }
        }
        assert_eq!(ApiStandard::Scorm12.resolve("Initialize"), None);
        assert_eq!(ApiStandard::Scorm2004.resolve("LMSInitialize"), None);
        assert_eq!(ApiStandard::Scorm12.resolve("LMSFinish"), Some(ApiMethod::Terminate));
    }

    #[test]
    fn test_standard_parsing() {
        assert_eq!("1.2".parse::<ApiStandard>(), Ok(ApiStandard::Scorm12));
        assert_eq!("API_1484_11".parse::<ApiStandard>(), Ok(ApiStandard::Scorm2004));
        assert!("1.3".parse::<ApiStandard>().is_err());
        assert_eq!(ApiStandard::Scorm2004.to_string(), "2004");
    }

    #[test]
    fn test_global_names() {
        assert_eq!(ApiStandard::Scorm12.global_name(), "API");
        assert_eq!(ApiStandard::Scorm2004.global_name(), "API_1484_11");
    }
}
