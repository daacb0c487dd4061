//=========================================================================
// Scene Registry
//=========================================================================
//
// Process-wide catalog of scene descriptors.
//
// Scenes are known at build time and handed to the registry as a static
// manifest; there is no load-order-dependent self-registration. The
// registry stores only stateless descriptors (factories, schemas); live
// scene instances are created per run by the controller.
//
// Architecture:
//   Registry
//     ├─ descriptors: HashMap<id, SceneDescriptor>
//     └─ order: Vec<id>          (insertion order, drives listing)
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use log::warn;

//=== Internal Dependencies ===============================================

use crate::core::options::{parse_options, schema_defaults, OptionMap, Schema};
use crate::core::scene::Scene;

//=== Constants ===========================================================

/// The virtual blank scene. Never registered, always selectable: it is
/// the quiescent state and the fallback for unknown persisted ids.
pub const BLACK_SCENE: &str = "black";

//=== SceneDescriptor =====================================================

/// A registry entry: everything the host needs to list, configure, and
/// instantiate one scene.
#[derive(Clone)]
pub struct SceneDescriptor {
    /// Stable unique key, persisted in settings.
    pub id: &'static str,

    pub display_name: &'static str,

    /// False for scenes that render through the text layer only.
    pub uses_canvas: bool,

    /// Ordered option declarations.
    pub schema: Schema,

    /// Creates a fresh, uninitialized scene instance.
    pub factory: fn() -> Box<dyn Scene>,
}

impl fmt::Debug for SceneDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneDescriptor")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .field("uses_canvas", &self.uses_canvas)
            .field("schema_keys", &self.schema.len())
            .finish()
    }
}

//=== Registry ============================================================

/// Catalog of scene descriptors with stable insertion order.
#[derive(Debug, Default)]
pub struct Registry {
    descriptors: HashMap<String, SceneDescriptor>,
    order: Vec<String>,
}

impl Registry {
    //--- Construction -----------------------------------------------------

    pub fn new() -> Self {
        Self {
            descriptors: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Builds a registry from a static manifest, preserving its order.
    pub fn with_manifest(manifest: Vec<SceneDescriptor>) -> Self {
        let mut registry = Self::new();
        for descriptor in manifest {
            registry.register(descriptor);
        }
        registry
    }

    //--- Registration -----------------------------------------------------

    /// Registers a descriptor. Re-registering an id replaces the entry in
    /// place without duplicating its position in the listing order.
    pub fn register(&mut self, descriptor: SceneDescriptor) {
        let id = descriptor.id.to_string();
        if self.descriptors.insert(id.clone(), descriptor).is_some() {
            warn!(target: "registry", "Scene '{}' was already registered and has been replaced", id);
        } else {
            self.order.push(id);
        }
    }

    //--- Lookup -----------------------------------------------------------

    pub fn get(&self, id: &str) -> Option<&SceneDescriptor> {
        self.descriptors.get(id)
    }

    /// Registered scene ids in registration order. Excludes the virtual
    /// "black" scene.
    pub fn list(&self) -> &[String] {
        &self.order
    }

    /// "black" followed by every registered id: the full selectable set.
    pub fn list_with_black(&self) -> Vec<String> {
        let mut ids = Vec::with_capacity(self.order.len() + 1);
        ids.push(BLACK_SCENE.to_string());
        ids.extend(self.order.iter().cloned());
        ids
    }

    //--- Defaults ---------------------------------------------------------

    /// Default option values for one scene. Empty for unknown ids.
    pub fn get_defaults(&self, id: &str) -> OptionMap {
        match self.descriptors.get(id) {
            Some(descriptor) => schema_defaults(&descriptor.schema),
            None => OptionMap::new(),
        }
    }

    /// Default option values for every registered scene, in order.
    pub fn get_all_defaults(&self) -> BTreeMap<String, OptionMap> {
        self.order
            .iter()
            .map(|id| (id.clone(), self.get_defaults(id)))
            .collect()
    }

    //--- Option Parsing ---------------------------------------------------

    /// Coerces a raw option set against the named scene's schema.
    ///
    /// Unknown ids return the raw set unchanged; a stale persisted type
    /// must never turn into an error here.
    pub fn parse_options(&self, id: &str, raw: &OptionMap) -> OptionMap {
        match self.descriptors.get(id) {
            Some(descriptor) => parse_options(&descriptor.schema, raw),
            None => raw.clone(),
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::options::{OptionDef, OptionValue};
    use crate::core::scene::{Scene, SceneContext, SceneError};

    struct NullScene;

    impl Scene for NullScene {
        fn init(&mut self, _options: &OptionMap, _ctx: &mut SceneContext<'_>) -> Result<(), SceneError> {
            Ok(())
        }
        fn update(&mut self, _ctx: &mut SceneContext<'_>, _now_ms: f64) {}
        fn destroy(&mut self) {}
    }

    fn descriptor(id: &'static str) -> SceneDescriptor {
        SceneDescriptor {
            id,
            display_name: id,
            uses_canvas: true,
            schema: vec![("speed", OptionDef::range("Speed", 3, 1, 10))],
            factory: || Box::new(NullScene),
        }
    }

    //=====================================================================
    // Registration & Ordering Tests
    //=====================================================================

    #[test]
    fn list_preserves_registration_order() {
        let registry = Registry::with_manifest(vec![
            descriptor("stars"),
            descriptor("rain"),
            descriptor("drift"),
        ]);
        assert_eq!(registry.list(), &["stars", "rain", "drift"]);
    }

    #[test]
    fn reregistering_replaces_without_duplicating_order() {
        let mut registry = Registry::with_manifest(vec![descriptor("stars"), descriptor("rain")]);

        let mut replacement = descriptor("stars");
        replacement.display_name = "Starfield II";
        registry.register(replacement);

        assert_eq!(registry.list(), &["stars", "rain"], "order must not gain a duplicate");
        assert_eq!(registry.get("stars").unwrap().display_name, "Starfield II");
    }

    #[test]
    fn list_with_black_prepends_the_virtual_scene() {
        let registry = Registry::with_manifest(vec![descriptor("stars")]);
        assert_eq!(registry.list_with_black(), vec!["black", "stars"]);
    }

    #[test]
    fn black_is_never_a_registered_descriptor() {
        let registry = Registry::with_manifest(vec![descriptor("stars")]);
        assert!(registry.get(BLACK_SCENE).is_none());
    }

    //=====================================================================
    // Lookup & Defaults Tests
    //=====================================================================

    #[test]
    fn unknown_id_lookup_returns_none() {
        let registry = Registry::new();
        assert!(registry.get("missing").is_none());
        assert!(registry.get_defaults("missing").is_empty());
    }

    #[test]
    fn defaults_walk_the_schema() {
        let registry = Registry::with_manifest(vec![descriptor("stars")]);
        let defaults = registry.get_defaults("stars");
        assert_eq!(defaults.get("speed"), Some(&OptionValue::Int(3)));
    }

    #[test]
    fn all_defaults_cover_every_registered_scene() {
        let registry = Registry::with_manifest(vec![descriptor("stars"), descriptor("rain")]);
        let all = registry.get_all_defaults();
        assert_eq!(all.len(), 2);
        assert!(all.contains_key("stars") && all.contains_key("rain"));
    }

    //=====================================================================
    // Option Parsing Tests
    //=====================================================================

    #[test]
    fn parse_options_coerces_against_schema() {
        let registry = Registry::with_manifest(vec![descriptor("stars")]);
        let mut raw = OptionMap::new();
        raw.insert("speed", OptionValue::Text("7".to_string()));
        let parsed = registry.parse_options("stars", &raw);
        assert_eq!(parsed.get("speed"), Some(&OptionValue::Int(7)));
    }

    #[test]
    fn parse_options_for_unknown_id_returns_raw_unchanged() {
        let registry = Registry::new();
        let mut raw = OptionMap::new();
        raw.insert("anything", OptionValue::Text("kept".to_string()));
        let parsed = registry.parse_options("missing", &raw);
        assert_eq!(parsed, raw, "unknown ids must never throw or mangle input");
    }
}
