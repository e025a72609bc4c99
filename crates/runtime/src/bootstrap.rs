//! Publishing the APIs where course content looks for them.
//!
//! Content searches its own execution context and then its ancestors for an
//! object named `API` (1.2) or `API_1484_11` (2004). The host publishes both
//! into the course's context and, when allowed, into the parent's.

use crate::api::{ApiStandard, RuntimeApi};
use crate::scorm12::Scorm12Api;
use crate::scorm2004::Scorm2004Api;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Log line emitted once both APIs are published.
pub const READY_MESSAGE: &str = "SCORM API Wrapper loaded and ready";

/// Errors raised while publishing into a context.
#[derive(Debug, thiserror::Error)]
pub enum ExposeError {
    /// The context does not accept objects from this origin
    #[error("context refused publication of {0}")]
    Refused(String),
}

/// A scope of named objects content can resolve.
pub trait ExecutionContext {
    /// Publish an API under `name`.
    fn publish(&mut self, name: &str, api: Arc<dyn RuntimeApi>) -> Result<(), ExposeError>;

    /// Resolve a published API.
    fn lookup(&self, name: &str) -> Option<Arc<dyn RuntimeApi>>;
}

/// An in-memory execution context.
#[derive(Default)]
pub struct ContextScope {
    objects: HashMap<String, Arc<dyn RuntimeApi>>,
    foreign: bool,
}

impl ContextScope {
    /// A context that accepts publication.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context on another origin: lookups work, publication is refused.
    pub fn cross_origin() -> Self {
        Self {
            objects: HashMap::new(),
            foreign: true,
        }
    }

    /// Names currently published.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.objects.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl ExecutionContext for ContextScope {
    fn publish(&mut self, name: &str, api: Arc<dyn RuntimeApi>) -> Result<(), ExposeError> {
        if self.foreign {
            return Err(ExposeError::Refused(name.to_string()));
        }
        self.objects.insert(name.to_string(), api);
        Ok(())
    }

    fn lookup(&self, name: &str) -> Option<Arc<dyn RuntimeApi>> {
        self.objects.get(name).cloned()
    }
}

/// Both published APIs.
#[derive(Clone)]
pub struct ExposedApis {
    /// `API`
    pub api: Scorm12Api,

    /// `API_1484_11`
    pub api_1484_11: Scorm2004Api,
}

fn publish_both(context: &mut dyn ExecutionContext, apis: &ExposedApis) -> Result<(), ExposeError> {
    context.publish(ApiStandard::Scorm12.global_name(), Arc::new(apis.api.clone()))?;
    context.publish(
        ApiStandard::Scorm2004.global_name(),
        Arc::new(apis.api_1484_11.clone()),
    )?;
    Ok(())
}

/// Publish both APIs into `local` and, best effort, into `parent`.
///
/// A refusal from the parent is expected when it lives on another origin and
/// is ignored.
pub fn expose(
    api: &Scorm12Api,
    local: &mut dyn ExecutionContext,
    parent: Option<&mut dyn ExecutionContext>,
) -> ExposedApis {
    let apis = ExposedApis {
        api: api.clone(),
        api_1484_11: Scorm2004Api::new(api),
    };

    if let Err(e) = publish_both(local, &apis) {
        warn!("Could not publish runtime API locally: {}", e);
    }
    if let Some(parent) = parent {
        if let Err(e) = publish_both(parent, &apis) {
            debug!("Parent context not reachable: {}", e);
        }
    }

    api.notifier().log(READY_MESSAGE, None);
    apis
}

/// Find an API the way content does: nearest context first.
pub fn find_api(
    chain: &[&dyn ExecutionContext],
    standard: ApiStandard,
) -> Option<Arc<dyn RuntimeApi>> {
    chain
        .iter()
        .find_map(|context| context.lookup(standard.global_name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::RuntimeSession;
    use scormbridge_core::cmi::keys;
    use scormbridge_core::ParentMessage;
    use scormbridge_progress::{ProgressNotifier, RecordingChannel};

    fn api() -> (Scorm12Api, Arc<RecordingChannel>) {
        let channel = Arc::new(RecordingChannel::new());
        let notifier = ProgressNotifier::new(5).with_channel(channel.clone());
        (Scorm12Api::new(RuntimeSession::new(), notifier), channel)
    }

    #[test]
    fn test_expose_into_local_and_parent() {
        let (api, channel) = api();
        let mut local = ContextScope::new();
        let mut parent = ContextScope::new();

        expose(&api, &mut local, Some(&mut parent as &mut dyn ExecutionContext));

        assert_eq!(local.names(), vec!["API", "API_1484_11"]);
        assert_eq!(parent.names(), vec!["API", "API_1484_11"]);
        assert_eq!(channel.messages(), vec![ParentMessage::log(READY_MESSAGE, None)]);
    }

    #[test]
    fn test_cross_origin_parent_is_ignored() {
        let (api, _) = api();
        let mut local = ContextScope::new();
        let mut parent = ContextScope::cross_origin();

        let apis = expose(&api, &mut local, Some(&mut parent as &mut dyn ExecutionContext));

        assert!(parent.names().is_empty());
        assert_eq!(local.names().len(), 2);
        assert_eq!(apis.api_1484_11.initialize(""), "true");
    }

    #[test]
    fn test_find_api_walks_up() {
        let (api, _) = api();
        let mut top = ContextScope::new();
        expose(&api, &mut top, None);
        let frame = ContextScope::new();

        let chain: [&dyn ExecutionContext; 2] = [&frame, &top];
        let found = find_api(&chain, ApiStandard::Scorm2004).unwrap();
        assert_eq!(found.standard(), ApiStandard::Scorm2004);

        found.set_value(keys::LOCATION, "slide_2");
        assert_eq!(api.state().current_slide, 2);

        let lone: [&dyn ExecutionContext; 1] = [&frame];
        assert!(find_api(&lone, ApiStandard::Scorm12).is_none());
    }

    #[test]
    fn test_published_apis_share_one_session() {
        let (api, _) = api();
        let mut local = ContextScope::new();
        expose(&api, &mut local, None);

        let v12 = local.lookup("API").unwrap();
        let v2004 = local.lookup("API_1484_11").unwrap();
        v12.set_value(keys::SUSPEND_DATA, "shared");
        assert_eq!(v2004.get_value(keys::SUSPEND_DATA), "shared");
    }
}
