use foundation::time::TimeSelector;

/// Handle for one attached overlay. Handles are never reused, so settle
/// callbacks from a replaced provider can be told apart from current ones.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct LayerId(pub u64);

/// Tile image encoding offered by the remote service.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    /// File extension used in tile URLs.
    pub fn ext(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
        }
    }
}

impl std::str::FromStr for ImageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
            "png" => Ok(ImageFormat::Png),
            other => Err(format!("unknown image format: {other:?}")),
        }
    }
}

/// What to show: a layer at a point in time in a given encoding.
///
/// Specs are values; changing layer or date builds a new spec and a new
/// attached layer rather than mutating the old one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OverlaySpec {
    pub layer: String,
    pub time: TimeSelector,
    pub format: ImageFormat,
}

impl OverlaySpec {
    pub fn new(layer: impl Into<String>, time: TimeSelector, format: ImageFormat) -> Self {
        Self {
            layer: layer.into(),
            time,
            format,
        }
    }
}

/// An overlay attached to the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayLayer {
    pub id: LayerId,
    pub spec: OverlaySpec,
    /// Current alpha in [0, 1]; owned by the health policy.
    pub alpha: f64,
    pub show: bool,
}

/// A known imagery layer, for pickers and CLI validation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: &'static str,
    pub title: &'static str,
    pub format: ImageFormat,
}

/// Daily imagery layers the viewer offers out of the box.
pub const LAYER_CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        id: "MODIS_Terra_CorrectedReflectance_TrueColor",
        title: "MODIS Terra true color",
        format: ImageFormat::Jpeg,
    },
    CatalogEntry {
        id: "MODIS_Aqua_CorrectedReflectance_TrueColor",
        title: "MODIS Aqua true color",
        format: ImageFormat::Jpeg,
    },
    CatalogEntry {
        id: "VIIRS_SNPP_CorrectedReflectance_TrueColor",
        title: "VIIRS true color",
        format: ImageFormat::Jpeg,
    },
    CatalogEntry {
        id: "MODIS_Terra_Snow_Cover",
        title: "MODIS Terra snow cover",
        format: ImageFormat::Png,
    },
];

pub fn catalog_entry(id: &str) -> Option<&'static CatalogEntry> {
    LAYER_CATALOG.iter().find(|e| e.id == id)
}
