//! WFS-T `Update` transactions for polygon features.

use geo_types::LineString;

use super::xml::{Document, Element, XmlError};
use crate::models::{Feature, FeatureId};

pub const WFS_NS: &str = "http://www.opengis.net/wfs";
pub const GML_NS: &str = "http://www.opengis.net/gml";
pub const OGC_NS: &str = "http://www.opengis.net/ogc";
pub const SRS_NAME: &str = "EPSG:4326";

/// Fewest positions a closed GML LinearRing may hold.
pub const MIN_RING_POSITIONS: usize = 4;

/// One `wfs:Update`: new attribute values and exterior ring for a feature.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub feature_id: FeatureId,
    /// Attribute name/value pairs, already rendered to text.
    pub properties: Vec<(String, String)>,
    pub ring: LineString<f64>,
}

impl Update {
    /// Build an update from a feature. Null attributes are not written.
    pub fn from_feature(feature: &Feature, geometry_property: &str) -> Self {
        let properties = feature
            .attributes
            .iter()
            .filter(|(name, _)| name.as_str() != geometry_property)
            .filter_map(|(name, value)| value.to_wire().map(|v| (name.clone(), v)))
            .collect();
        Self {
            feature_id: feature.id.clone(),
            properties,
            ring: feature.ring.clone(),
        }
    }
}

/// A `wfs:Transaction` against one feature type.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// Qualified type name, e.g. `test:test`.
    pub type_name: String,
    /// Namespace URI bound to the type name's prefix, if it must be declared.
    pub namespace_uri: Option<String>,
    pub geometry_property: String,
    pub updates: Vec<Update>,
}

impl Transaction {
    pub fn new(type_name: impl Into<String>, geometry_property: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            namespace_uri: None,
            geometry_property: geometry_property.into(),
            updates: Vec::new(),
        }
    }

    pub fn with_namespace(mut self, uri: Option<String>) -> Self {
        self.namespace_uri = uri;
        self
    }

    pub fn push(&mut self, update: Update) {
        self.updates.push(update);
    }

    pub fn to_document(&self) -> Document {
        let mut root = Element::new("wfs:Transaction")
            .attr("service", "WFS")
            .attr("version", "1.1.0")
            .attr("xmlns:wfs", WFS_NS)
            .attr("xmlns:gml", GML_NS)
            .attr("xmlns:ogc", OGC_NS);
        if let (Some(uri), Some((prefix, _))) =
            (&self.namespace_uri, self.type_name.split_once(':'))
        {
            root = root.attr(format!("xmlns:{}", prefix), uri.clone());
        }

        for update in &self.updates {
            root.push(self.update_element(update));
        }
        Document::new(root)
    }

    /// Serialize the whole transaction to the request body.
    pub fn to_xml(&self) -> Result<String, XmlError> {
        self.to_document().to_xml()
    }

    fn update_element(&self, update: &Update) -> Element {
        let properties = update
            .properties
            .iter()
            .map(|(name, value)| property(name, Element::new("wfs:Value").text(value.clone())));

        let geometry = property(
            &self.geometry_property,
            Element::new("wfs:Value").child(polygon(&update.ring)),
        );

        Element::new("wfs:Update")
            .attr("typeName", self.type_name.clone())
            .children(properties)
            .child(geometry)
            .child(
                Element::new("ogc:Filter").child(
                    Element::new("ogc:FeatureId").attr("fid", update.feature_id.as_str()),
                ),
            )
    }
}

fn property(name: &str, value: Element) -> Element {
    Element::new("wfs:Property")
        .child(Element::with_text("wfs:Name", name))
        .child(value)
}

fn polygon(ring: &LineString<f64>) -> Element {
    Element::new("gml:Polygon").attr("srsName", SRS_NAME).child(
        Element::new("gml:exterior").child(
            Element::new("gml:LinearRing").child(Element::with_text("gml:posList", pos_list(ring))),
        ),
    )
}

/// Number of positions the ring has once [`pos_list`] has closed it.
pub fn closed_len(ring: &LineString<f64>) -> usize {
    match (ring.0.first(), ring.0.last()) {
        (Some(first), Some(last)) if first != last => ring.0.len() + 1,
        _ => ring.0.len(),
    }
}

/// Flattened `lon lat lon lat ...` list. An open ring is closed here so the
/// server always receives a valid LinearRing.
pub fn pos_list(ring: &LineString<f64>) -> String {
    let mut coords = ring.0.clone();
    if let (Some(first), Some(last)) = (coords.first().copied(), coords.last().copied()) {
        if first != last {
            tracing::debug!("Closing open ring for transaction");
            coords.push(first);
        }
    }
    coords
        .iter()
        .map(|c| format!("{} {}", c.x, c.y))
        .collect::<Vec<_>>()
        .join(" ")
}
