//! Plugin and widget registry.
//!
//! A registry is built by the host and handed to each session it creates;
//! there is no process-wide table. Plugins are functions run once per name
//! listed in the `plugins` option. Widgets are the state-bearing children a
//! session resets along with itself.

use crate::core::backend::MediaBackend;
use crate::core::session::Session;
use indexmap::IndexMap;
use log::debug;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Plugin entry point: receives the session and its options block.
pub type PluginFn<B> = Box<dyn Fn(&mut Session<B>, &serde_json::Value) -> anyhow::Result<()> + Send + Sync>;

pub type WidgetFactory = Box<dyn Fn() -> Box<dyn Widget> + Send + Sync>;

/// Child component of a session.
pub trait Widget: Send {
    fn name(&self) -> &str;

    /// Return to the no-source state. Optional.
    fn reset(&mut self) {}
}

pub struct Registry<B: MediaBackend> {
    plugins: IndexMap<String, PluginFn<B>>,
    widgets: IndexMap<String, WidgetFactory>,
}

impl<B: MediaBackend> Default for Registry<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: MediaBackend> fmt::Debug for Registry<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("plugins", &self.plugins.keys().collect::<Vec<_>>())
            .field("widgets", &self.widgets.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<B: MediaBackend> Registry<B> {
    pub fn new() -> Self {
        Self {
            plugins: IndexMap::new(),
            widgets: IndexMap::new(),
        }
    }

    /// Registers a plugin. A later registration under the same name replaces it.
    pub fn register_plugin<F>(&mut self, name: &str, plugin: F)
    where
        F: Fn(&mut Session<B>, &serde_json::Value) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        if self.plugins.insert(name.to_string(), Box::new(plugin)).is_some() {
            debug!("Registry: plugin {} replaced", name);
        }
    }

    pub fn register_widget<F>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> Box<dyn Widget> + Send + Sync + 'static,
    {
        if self.widgets.insert(name.to_string(), Box::new(factory)).is_some() {
            debug!("Registry: widget {} replaced", name);
        }
    }

    pub fn plugin(&self, name: &str) -> Option<&PluginFn<B>> {
        self.plugins.get(name)
    }

    pub fn has_plugin(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    pub fn create_widget(&self, name: &str) -> Option<Box<dyn Widget>> {
        self.widgets.get(name).map(|factory| factory())
    }

    /// Registry with a stand-in widget for each default child name.
    pub fn with_default_widgets() -> Self {
        let mut registry = Self::new();
        for name in crate::config::DEFAULT_CHILDREN {
            registry.register_widget(name, move || Box::new(StubWidget::new(name)));
        }
        registry
    }
}

/// Widget without rendering; counts its resets.
#[derive(Debug, Clone)]
pub struct StubWidget {
    name: String,
    resets: Arc<AtomicUsize>,
}

impl StubWidget {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            resets: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared reset counter, readable after the widget was boxed.
    pub fn reset_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.resets)
    }
}

impl Widget for StubWidget {
    fn name(&self) -> &str {
        &self.name
    }

    fn reset(&mut self) {
        self.resets.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sim_backend::SimBackend;

    struct Inert;

    impl Widget for Inert {
        fn name(&self) -> &str {
            "inert"
        }
    }

    #[test]
    fn widgets_by_name() {
        let mut registry: Registry<SimBackend> = Registry::new();
        registry.register_widget("inert", || Box::new(Inert));

        let mut widget = registry.create_widget("inert").unwrap();
        assert_eq!(widget.name(), "inert");
        // Default reset is a no-op
        widget.reset();
        assert!(registry.create_widget("missing").is_none());
    }

    #[test]
    fn default_widgets_cover_default_children() {
        let registry: Registry<SimBackend> = Registry::with_default_widgets();
        for name in crate::config::DEFAULT_CHILDREN {
            assert_eq!(registry.create_widget(name).map(|w| w.name().to_string()), Some(name.to_string()));
        }
    }

    #[test]
    fn plugin_lookup() {
        let mut registry: Registry<SimBackend> = Registry::new();
        registry.register_plugin("noop", |_, _| Ok(()));
        assert!(registry.has_plugin("noop"));
        assert!(registry.plugin("hls").is_none());
    }

    #[test]
    fn stub_counts_resets() {
        let stub = StubWidget::new("loading");
        let counter = stub.reset_counter();
        let mut boxed: Box<dyn Widget> = Box::new(stub);
        boxed.reset();
        boxed.reset();
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }
}
