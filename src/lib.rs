//! Geophylogeny - WASM Module
//!
//! Leaf ordering and placement for geophylogenies: a binary phylogenetic
//! tree drawn next to a map, its leaves on a boundary (the top edge of a
//! box, or a circle) close to their geographic sites, without crossing
//! tree edges. Compiled to WebAssembly with a JavaScript-friendly API via
//! wasm-bindgen; every algorithm is plain Rust and usable natively.
//!
//! # Architecture
//!
//! - `tree`: binary tree arena, sites and feasibility intervals
//! - `geometry`: points, angles, circular ranges, enclosing circles
//! - `boundary`: rectangular and circular layout contexts
//! - `layout`: discrete DP ordering, continuous (sliding) pipeline and
//!   inner-node propagation
//! - `geophylogeny`: configuration-driven context and serializable result
//! - `spatial`: R-tree spatial indexing for hit testing

use js_sys::Float64Array;
use wasm_bindgen::prelude::*;

pub mod boundary;
pub mod config;
pub mod error;
pub mod geometry;
pub mod geophylogeny;
pub mod layout;
pub mod spatial;
pub mod tree;

pub use config::LayoutConfig;
pub use error::LayoutError;
pub use geophylogeny::{Geophylogeny, LayoutResult};

use spatial::SpatialIndex;
use tree::{PhyloTree, TreeSpec, sites_from_flat};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Log an error to the browser console and hand it to JavaScript.
fn js_error(message: String) -> JsError {
    web_sys::console::error_1(&JsValue::from_str(&message));
    JsError::new(&message)
}

/// `undefined`/`null` selects the default configuration.
fn parse_config(config: JsValue) -> Result<LayoutConfig, JsError> {
    if config.is_undefined() || config.is_null() {
        return Ok(LayoutConfig::default());
    }
    serde_wasm_bindgen::from_value(config)
        .map_err(|err| js_error(format!("invalid layout config: {}", err)))
}

/// Build a layout context from a tree and a flat `[x0, y0, ...]` site
/// buffer.
fn build(tree: PhyloTree, sites: &[f64], config: LayoutConfig) -> error::Result<Geophylogeny> {
    if sites.len() % 2 != 0 {
        return Err(LayoutError::InvalidConfig(format!(
            "site buffer must hold (x, y) pairs, got {} values",
            sites.len()
        )));
    }
    Geophylogeny::new(tree, sites_from_flat(sites), config)
}

/// Main entry point for JavaScript.
///
/// Wraps a [`Geophylogeny`] together with the last computed result and a
/// spatial index over it.
#[wasm_bindgen]
pub struct GeophylogenyWasm {
    layout: Geophylogeny,
    result: Option<LayoutResult>,
    index: Option<SpatialIndex>,
}

impl GeophylogenyWasm {
    fn wrap(layout: Geophylogeny) -> Self {
        Self {
            layout,
            result: None,
            index: None,
        }
    }
}

#[wasm_bindgen]
impl GeophylogenyWasm {
    /// Create a layout from a nested tree and a site buffer.
    ///
    /// # Arguments
    ///
    /// * `tree` - `{ site }` for leaves, `{ children: [a, b] }` for inner nodes
    /// * `sites` - Flat `[x0, y0, x1, y1, ...]`, indexed by site number
    /// * `config` - Layout configuration object, or `undefined` for defaults
    #[wasm_bindgen(constructor)]
    pub fn new(
        tree: JsValue,
        sites: &[f64],
        config: JsValue,
    ) -> Result<GeophylogenyWasm, JsError> {
        let spec: TreeSpec = serde_wasm_bindgen::from_value(tree)
            .map_err(|err| js_error(format!("invalid tree: {}", err)))?;
        let config = parse_config(config)?;
        let tree = PhyloTree::from_spec(&spec).map_err(|err| js_error(err.to_string()))?;
        let layout = build(tree, sites, config).map_err(|err| js_error(err.to_string()))?;
        Ok(Self::wrap(layout))
    }

    /// Create a layout from directed edge pairs.
    ///
    /// # Arguments
    ///
    /// * `edges` - Flat `[parent0, child0, parent1, child1, ...]`
    /// * `leaf_sites` - Flat `[leaf0, site0, leaf1, site1, ...]`
    /// * `sites` - Flat `[x0, y0, x1, y1, ...]`
    /// * `config` - Layout configuration object, or `undefined` for defaults
    #[wasm_bindgen(js_name = fromEdges)]
    pub fn from_edges(
        edges: &[u32],
        leaf_sites: &[u32],
        sites: &[f64],
        config: JsValue,
    ) -> Result<GeophylogenyWasm, JsError> {
        let config = parse_config(config)?;
        let tree =
            PhyloTree::from_edges(edges, leaf_sites).map_err(|err| js_error(err.to_string()))?;
        let layout = build(tree, sites, config).map_err(|err| js_error(err.to_string()))?;
        Ok(Self::wrap(layout))
    }

    /// Run the configured pipeline and return the layout result.
    pub fn run(&mut self) -> Result<JsValue, JsError> {
        let result = self.layout.run().map_err(|err| js_error(err.to_string()))?;
        self.index = Some(self.layout.spatial_index());
        let value = serde_wasm_bindgen::to_value(&result)
            .map_err(|err| js_error(format!("failed to serialize layout: {}", err)))?;
        self.result = Some(result);
        Ok(value)
    }

    /// Last layout result, or `undefined` before `run()`.
    pub fn result(&self) -> Result<JsValue, JsError> {
        match &self.result {
            Some(result) => serde_wasm_bindgen::to_value(result)
                .map_err(|err| js_error(format!("failed to serialize layout: {}", err))),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// Node positions `[x0, y0, x1, y1, ...]`, indexed by node id.
    pub fn positions(&self) -> Float64Array {
        Float64Array::from(&self.layout.positions()[..])
    }

    /// Leaf node ids in drawing order.
    #[wasm_bindgen(js_name = leafOrder)]
    pub fn leaf_order(&self) -> Vec<u32> {
        self.layout.leaf_order().iter().map(|id| id.raw()).collect()
    }

    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> usize {
        self.layout.tree().node_count()
    }

    #[wasm_bindgen(js_name = leafCount)]
    pub fn leaf_count(&self) -> usize {
        self.layout.tree().leaf_count()
    }

    // =========================================================================
    // Spatial Queries
    // =========================================================================

    /// Find the nearest node to a point.
    ///
    /// Returns the node ID, or None before `run()`.
    #[wasm_bindgen(js_name = findNearestNode)]
    pub fn find_nearest_node(&self, x: f64, y: f64) -> Option<u32> {
        self.index
            .as_ref()
            .and_then(|index| index.nearest(x, y))
            .map(|id| id.raw())
    }

    /// Find the nearest node within a maximum distance.
    #[wasm_bindgen(js_name = findNearestNodeWithin)]
    pub fn find_nearest_node_within(&self, x: f64, y: f64, max_distance: f64) -> Option<u32> {
        self.index
            .as_ref()
            .and_then(|index| index.nearest_within(x, y, max_distance))
            .map(|id| id.raw())
    }

    /// Find all nodes within a rectangular region.
    #[wasm_bindgen(js_name = findNodesInRect)]
    pub fn find_nodes_in_rect(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Vec<u32> {
        self.index
            .as_ref()
            .map(|index| {
                index
                    .in_rect(min_x, min_y, max_x, max_y)
                    .into_iter()
                    .map(|id| id.raw())
                    .collect()
            })
            .unwrap_or_default()
    }
}
