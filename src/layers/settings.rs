//! Per-layer display and interaction settings.

/// Settings record attached to every registered layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerSettings {
    /// Opacity in percent (0-100)
    pub opacity: u8,
    /// Whether the layer is shown
    pub visible: bool,
    /// Whether the layer may be discretized with k-means
    pub discretizable: bool,
    /// Discrete view toggled on
    pub discrete_active: bool,
    /// Discrete menu open
    pub discrete_menu_open: bool,
    /// k-means menu open
    pub kmeans_menu_open: bool,
    /// Layer content has been replaced by its cluster centroids
    pub kmeans_clustered: bool,
}

impl LayerSettings {
    /// Default settings for a freshly registered layer.
    pub fn new(discretizable: bool) -> Self {
        Self {
            opacity: 100,
            visible: true,
            discretizable,
            discrete_active: false,
            discrete_menu_open: false,
            kmeans_menu_open: false,
            kmeans_clustered: false,
        }
    }

    /// Whether a boolean property is set.
    pub fn has(&self, property: LayerProperty) -> bool {
        match property {
            LayerProperty::Visible => self.visible,
            LayerProperty::Discretizable => self.discretizable,
            LayerProperty::DiscreteActive => self.discrete_active,
            LayerProperty::DiscreteMenuOpen => self.discrete_menu_open,
            LayerProperty::KmeansMenuOpen => self.kmeans_menu_open,
            LayerProperty::KmeansClustered => self.kmeans_clustered,
        }
    }

    /// Opacity as a 0.0-1.0 factor.
    pub fn alpha(&self) -> f32 {
        f32::from(self.opacity.min(100)) / 100.0
    }
}

impl Default for LayerSettings {
    fn default() -> Self {
        Self::new(false)
    }
}

/// Boolean layer properties usable as filters in active-layer lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerProperty {
    /// `visible`
    Visible,
    /// `discretizable`
    Discretizable,
    /// `discrete_active`
    DiscreteActive,
    /// `discrete_menu_open`
    DiscreteMenuOpen,
    /// `kmeans_menu_open`
    KmeansMenuOpen,
    /// `kmeans_clustered`
    KmeansClustered,
}
