// In-memory plot surface that records what each page element shows
use crate::application::plot_surface::PlotSurface;
use crate::domain::chart::Plot;
use crate::domain::render::SurfaceError;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceContent {
    Plot(Plot),
    Text(String),
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    elements: BTreeSet<String>,
    contents: BTreeMap<String, SurfaceContent>,
    plot_calls: usize,
}

impl RecordingSurface {
    pub fn with_elements<I, T>(elements: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            elements: elements.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn add_element(&mut self, element_id: impl Into<String>) {
        self.elements.insert(element_id.into());
    }

    pub fn content(&self, element_id: &str) -> Option<&SurfaceContent> {
        self.contents.get(element_id)
    }

    pub fn plot_calls(&self) -> usize {
        self.plot_calls
    }

    /// Everything drawn so far, keyed by element id.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(&self.contents)
    }

    fn check(&self, element_id: &str) -> Result<(), SurfaceError> {
        if self.elements.contains(element_id) {
            Ok(())
        } else {
            Err(SurfaceError::UnknownElement(element_id.to_string()))
        }
    }
}

impl PlotSurface for RecordingSurface {
    fn has_element(&self, element_id: &str) -> bool {
        self.elements.contains(element_id)
    }

    fn plot(&mut self, element_id: &str, plot: &Plot) -> Result<(), SurfaceError> {
        self.check(element_id)?;
        self.plot_calls += 1;
        self.contents
            .insert(element_id.to_string(), SurfaceContent::Plot(plot.clone()));
        Ok(())
    }

    fn write_text(&mut self, element_id: &str, text: &str) -> Result<(), SurfaceError> {
        self.check(element_id)?;
        self.contents
            .insert(element_id.to_string(), SurfaceContent::Text(text.to_string()));
        Ok(())
    }
}
