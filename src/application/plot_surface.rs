// Plot surface trait - the drawable page the charts are rendered into
use crate::domain::chart::Plot;
use crate::domain::render::SurfaceError;

pub trait PlotSurface {
    /// Whether the page has an element with this id
    fn has_element(&self, element_id: &str) -> bool;

    /// Draw a plot into the element, replacing whatever it showed before
    fn plot(&mut self, element_id: &str, plot: &Plot) -> Result<(), SurfaceError>;

    /// Replace the element's content with plain text
    fn write_text(&mut self, element_id: &str, text: &str) -> Result<(), SurfaceError>;
}
