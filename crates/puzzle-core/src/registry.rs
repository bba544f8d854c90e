//! Game id to module table, built once at startup.

use crate::error::EngineError;
use crate::games::*;
use crate::module::{DynGame, GameInfo, GameModule};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Read-only lookup of every registered family.
#[derive(Clone, Default)]
pub struct Registry {
    modules: BTreeMap<&'static str, Arc<dyn DynGame>>,
    order: Vec<&'static str>,
}

#[derive(Default)]
pub struct RegistryBuilder {
    inner: Registry,
}

impl RegistryBuilder {
    /// Add a family. A later registration under the same id replaces the earlier one.
    pub fn register<M: GameModule + 'static>(mut self, module: M) -> Self {
        let id = GameModule::info(&module).id;
        if self.inner.modules.insert(id, Arc::new(module)).is_none() {
            self.inner.order.push(id);
        }
        self
    }

    pub fn build(self) -> Registry {
        self.inner
    }
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Every family that ships with the engine.
    pub fn builtin() -> Self {
        Self::builder()
            .register(Sudoku)
            .register(KenKen)
            .register(Minesweeper)
            .register(Nonogram)
            .register(LogicGrid)
            .register(Routes)
            .register(PointsTable)
            .register(Scheduling)
            .register(TargetNumber)
            .register(Drill(MentalMath))
            .register(Drill(Estimation))
            .register(Drill(RatioMixer))
            .register(Drill(NumberSeries))
            .register(Drill(Analogies))
            .register(Drill(OddOneOut))
            .register(Drill(Syllogisms))
            .register(Drill(LetterCoding))
            .build()
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn DynGame>> {
        self.modules.get(id).cloned()
    }

    pub fn require(&self, id: &str) -> Result<Arc<dyn DynGame>, EngineError> {
        self.get(id).ok_or_else(|| EngineError::UnknownGame(id.to_string()))
    }

    /// Ids in registration order.
    pub fn ids(&self) -> &[&'static str] {
        &self.order
    }

    pub fn infos(&self) -> impl Iterator<Item = &GameInfo> + '_ {
        self.order.iter().filter_map(|id| self.modules.get(id)).map(|m| m.info())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_has_every_family() {
        let registry = Registry::builtin();
        assert_eq!(registry.len(), 17);
        assert_eq!(registry.ids()[0], "sudoku");
        for id in ["kenken", "routes", "points-table", "target-number", "ratio-mixer", "letter-coding"] {
            assert!(registry.get(id).is_some(), "{} missing", id);
        }
    }

    #[test]
    fn test_partial_registry() {
        let registry = Registry::builder().register(Routes).register(Routes).build();
        assert_eq!(registry.ids(), &["routes"]);
        assert!(matches!(registry.require("sudoku"), Err(EngineError::UnknownGame(_))));
    }

    #[test]
    fn test_infos_follow_order() {
        let registry = Registry::builtin();
        let ids: Vec<&str> = registry.infos().map(|i| i.id).collect();
        assert_eq!(ids, registry.ids());
    }
}
