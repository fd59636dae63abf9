use anyhow::Result;
use pymate_core::context::{Markers, SessionContext};
use pymate_core::discovery::{Discovery, SystemDiscovery};
use pymate_core::features::FeatureFlags;
use pymate_core::interpreter::InterpreterRecord;
use pymate_core::layout::Layout;
use pymate_core::reconcile::{ApplyOutcome, ApplyRequest, Reconciler};
use pymate_core::registry::{PathRegistry, system_registry};
use pymate_core::scope::Scope;
use pymate_core::session::{ScriptFlavor, SessionRequest, SessionScript, SessionScriptGenerator};
use pymate_core::state::StateStore;
use pymate_platform::privilege;

/// Everything a command needs, set up once in `main`.
pub struct Runtime {
    pub layout: Layout,
    pub store: StateStore,
    pub registry: Box<dyn PathRegistry>,
    pub discovery: Box<dyn Discovery>,
    pub markers: Markers,
    /// Whether the machine-wide PATH may be written.
    pub elevated: bool,
}

impl Runtime {
    pub fn detect() -> Self {
        let layout = Layout::detect();
        Self {
            store: StateStore::new(layout.state_file()),
            layout,
            registry: system_registry(),
            discovery: Box::new(SystemDiscovery),
            markers: Markers::from_env(),
            elevated: privilege::is_elevated(),
        }
    }

    pub fn features(&self) -> FeatureFlags {
        FeatureFlags::load(&self.layout.features_file())
    }

    pub fn scan(&self) -> Vec<InterpreterRecord> {
        self.discovery.discover()
    }

    /// A fresh context with a full interpreter scan.
    pub fn context(&self) -> SessionContext {
        SessionContext::new(self.scan(), self.markers.clone())
    }

    pub fn active(&self, ctx: &SessionContext) -> Option<InterpreterRecord> {
        ctx.resolve_active(&self.store.load(), self.discovery.as_ref())
            .map(|a| a.record)
    }

    pub fn apply(&self, scope: Scope, request: &ApplyRequest) -> Result<ApplyOutcome> {
        if scope == Scope::System && !self.elevated {
            return Err(pymate_core::Error::PrivilegeRequired { scope }.into());
        }
        self.layout.ensure()?;
        let outcome = Reconciler::new(self.registry.as_ref(), &self.store)
            .apply_managed_paths(scope, request)?;
        Ok(outcome)
    }

    pub fn write_session(
        &self,
        active: Option<&InterpreterRecord>,
        request: &SessionRequest,
        flavor: ScriptFlavor,
    ) -> Result<SessionScript> {
        let features = self.features();
        let script = SessionScriptGenerator::new(&self.layout, &features, flavor)
            .generate(active, request)?;
        Ok(script)
    }
}

#[cfg(test)]
impl Runtime {
    /// A runtime rooted at `root` with an in-memory user PATH of `/usr/bin`.
    pub(crate) fn in_memory(root: &std::path::Path, discovered: Vec<InterpreterRecord>) -> Self {
        use pymate_core::registry::MemoryRegistry;

        let layout = Layout::at(root);
        Self {
            store: StateStore::new(layout.state_file()),
            layout,
            registry: Box::new(MemoryRegistry::new(':').with_value(Scope::User, "/usr/bin")),
            discovery: Box::new(discovered),
            markers: Markers::default(),
            elevated: true,
        }
    }
}
