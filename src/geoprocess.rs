//! Boundary to an external geoprocessing engine.
//!
//! Clipping, buffering, merging, dissolving, masking, joining and raster
//! conversion are done
//! by a GIS library bound at the call site. [`GeoprocessingEngine`] is the
//! narrow capability surface the study needs from it; the functions below
//! only sequence those calls.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::BufferDistances;
use crate::error::Result;

/// A dataset handle understood by the engine, usually a file path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Layer(pub PathBuf);

impl Layer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

/// Geoprocessing operations delegated to an external engine.
///
/// Each operation writes to `output` and returns the layer it produced.
#[async_trait]
pub trait GeoprocessingEngine: Send + Sync {
    async fn clip_to(&self, input: &Layer, boundary: &Layer, output: &Layer) -> Result<Layer>;

    /// Buffers every feature of `inputs` by `distance_m` meters into one layer.
    async fn buffer_by(&self, inputs: &[Layer], distance_m: f64, output: &Layer) -> Result<Layer>;

    async fn merge_all(&self, inputs: &[Layer], output: &Layer) -> Result<Layer>;

    /// Dissolves features sharing `field`, or all features when `field` is `None`.
    async fn dissolve_by(
        &self,
        input: &Layer,
        field: Option<&str>,
        output: &Layer,
    ) -> Result<Layer>;

    /// Keeps the cells of `raster` that fall inside the `mask` features.
    async fn extract_by_mask(
        &self,
        raster: &Layer,
        mask: &Layer,
        output: &Layer,
    ) -> Result<Layer>;

    async fn raster_to_points(
        &self,
        raster: &Layer,
        field: &str,
        output: &Layer,
    ) -> Result<Layer>;

    /// One-to-one join keeping every target feature. With `search_radius_m`
    /// the join matches within that geodesic distance, otherwise by
    /// intersection.
    async fn spatial_join(
        &self,
        target: &Layer,
        join: &Layer,
        search_radius_m: Option<f64>,
        output: &Layer,
    ) -> Result<Layer>;
}

/// Stop layers and study boundary for a service-area run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitLayers {
    pub bus_stops: Layer,
    pub tram_stops: Layer,
    pub railway_stations: Layer,
    pub ferry_terminals: Layer,
    pub boundary: Layer,
}

/// Computes the area within walking distance of any transit stop.
///
/// Stops are clipped to the boundary, bus stops buffered by
/// `buffers.bus_stop_m` and every other mode by `buffers.other_transit_m`;
/// the buffers are merged, clipped to the boundary again and dissolved into
/// `output`. Intermediate layers are written under `workspace`.
#[tracing::instrument(skip(engine, layers, workspace), fields(workspace = %workspace.display()))]
pub async fn valid_service_area<E: GeoprocessingEngine + ?Sized>(
    engine: &E,
    layers: &TransitLayers,
    buffers: &BufferDistances,
    workspace: &Path,
    output: &Layer,
) -> Result<Layer> {
    let scratch = |name: &str| Layer::new(workspace.join(name));
    let boundary = &layers.boundary;

    let bus = engine
        .clip_to(&layers.bus_stops, boundary, &scratch("bus_stops_clip.shp"))
        .await?;
    let tram = engine
        .clip_to(&layers.tram_stops, boundary, &scratch("tram_stops_clip.shp"))
        .await?;
    let railway = engine
        .clip_to(&layers.railway_stations, boundary, &scratch("railway_clip.shp"))
        .await?;
    let ferry = engine
        .clip_to(&layers.ferry_terminals, boundary, &scratch("ferry_clip.shp"))
        .await?;

    let bus_buffer = engine
        .buffer_by(&[bus], buffers.bus_stop_m, &scratch("bus_buffer.shp"))
        .await?;
    let other_buffer = engine
        .buffer_by(
            &[tram, railway, ferry],
            buffers.other_transit_m,
            &scratch("other_buffer.shp"),
        )
        .await?;

    let merged = engine
        .merge_all(&[bus_buffer, other_buffer], &scratch("merged_buffer.shp"))
        .await?;
    let clipped = engine
        .clip_to(&merged, boundary, &scratch("clipped_buffer.shp"))
        .await?;
    let area = engine.dissolve_by(&clipped, None, output).await?;

    info!(output = %area.path().display(), "Valid service area computed");
    Ok(area)
}

/// Layers produced by [`population_points`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationLayers {
    /// Population raster masked to the study boundary.
    pub total: Layer,
    /// Population raster masked to the valid service area.
    pub served: Layer,
    /// One point per served cell, carrying the cell value.
    pub points: Layer,
}

/// Masks a population raster to the study boundary and to the valid service
/// area, then converts the served cells to points.
///
/// Outputs are `population_all.tif`, `population_valid.tif` and
/// `population_points.shp` under `output_dir`.
#[tracing::instrument(
    skip(engine, raster, boundary, valid_area, output_dir),
    fields(output_dir = %output_dir.display())
)]
pub async fn population_points<E: GeoprocessingEngine + ?Sized>(
    engine: &E,
    raster: &Layer,
    boundary: &Layer,
    valid_area: &Layer,
    output_dir: &Path,
) -> Result<PopulationLayers> {
    let out = |name: &str| Layer::new(output_dir.join(name));

    let total = engine
        .extract_by_mask(raster, boundary, &out("population_all.tif"))
        .await?;
    let served = engine
        .extract_by_mask(raster, valid_area, &out("population_valid.tif"))
        .await?;
    let points = engine
        .raster_to_points(&served, "Value", &out("population_points.shp"))
        .await?;

    info!(points = %points.path().display(), "Population points extracted");
    Ok(PopulationLayers {
        total,
        served,
        points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StudyError;
    use std::sync::Mutex;

    /// Records every call instead of touching any data.
    #[derive(Default)]
    struct RecordingEngine {
        calls: Mutex<Vec<String>>,
        fail_on: Option<&'static str>,
    }

    impl RecordingEngine {
        fn record(&self, op: &str, detail: String, output: &Layer) -> Result<Layer> {
            if self.fail_on == Some(op) {
                return Err(StudyError::Geoprocessing(format!("{op} failed")));
            }
            self.calls.lock().unwrap().push(format!("{op} {detail}"));
            Ok(output.clone())
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    fn names(layers: &[Layer]) -> String {
        layers
            .iter()
            .map(|l| l.path().file_name().unwrap().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("+")
    }

    #[async_trait]
    impl GeoprocessingEngine for RecordingEngine {
        async fn clip_to(&self, input: &Layer, _boundary: &Layer, output: &Layer) -> Result<Layer> {
            self.record("clip", names(&[input.clone()]), output)
        }

        async fn buffer_by(
            &self,
            inputs: &[Layer],
            distance_m: f64,
            output: &Layer,
        ) -> Result<Layer> {
            self.record("buffer", format!("{} {distance_m}", names(inputs)), output)
        }

        async fn merge_all(&self, inputs: &[Layer], output: &Layer) -> Result<Layer> {
            self.record("merge", names(inputs), output)
        }

        async fn dissolve_by(
            &self,
            input: &Layer,
            _field: Option<&str>,
            output: &Layer,
        ) -> Result<Layer> {
            self.record("dissolve", names(&[input.clone()]), output)
        }

        async fn extract_by_mask(
            &self,
            raster: &Layer,
            mask: &Layer,
            output: &Layer,
        ) -> Result<Layer> {
            self.record("mask", names(&[raster.clone(), mask.clone()]), output)
        }

        async fn raster_to_points(
            &self,
            raster: &Layer,
            field: &str,
            output: &Layer,
        ) -> Result<Layer> {
            self.record("raster_to_points", format!("{} {field}", names(&[raster.clone()])), output)
        }

        async fn spatial_join(
            &self,
            target: &Layer,
            join: &Layer,
            search_radius_m: Option<f64>,
            output: &Layer,
        ) -> Result<Layer> {
            let radius = search_radius_m.map_or("intersect".to_string(), |r| format!("{r}"));
            let detail = format!("{} {radius}", names(&[target.clone(), join.clone()]));
            self.record("join", detail, output)
        }
    }

    fn layers() -> TransitLayers {
        TransitLayers {
            bus_stops: Layer::new("raw/bus.shp"),
            tram_stops: Layer::new("raw/tram.shp"),
            railway_stations: Layer::new("raw/railway.shp"),
            ferry_terminals: Layer::new("raw/ferry.shp"),
            boundary: Layer::new("raw/boundary.shp"),
        }
    }

    #[tokio::test]
    async fn test_service_area_call_sequence() {
        let engine = RecordingEngine::default();
        let output = Layer::new("out/valid_area.shp");

        let area = valid_service_area(
            &engine,
            &layers(),
            &BufferDistances::default(),
            Path::new("work"),
            &output,
        )
        .await
        .unwrap();

        assert_eq!(area, output);
        assert_eq!(
            engine.calls(),
            vec![
                "clip bus.shp",
                "clip tram.shp",
                "clip railway.shp",
                "clip ferry.shp",
                "buffer bus_stops_clip.shp 500",
                "buffer tram_stops_clip.shp+railway_clip.shp+ferry_clip.shp 1000",
                "merge bus_buffer.shp+other_buffer.shp",
                "clip merged_buffer.shp",
                "dissolve clipped_buffer.shp",
            ]
        );
    }

    #[tokio::test]
    async fn test_service_area_uses_configured_distances() {
        let engine = RecordingEngine::default();
        let buffers = BufferDistances {
            bus_stop_m: 300.0,
            other_transit_m: 800.0,
        };

        valid_service_area(
            &engine,
            &layers(),
            &buffers,
            Path::new("work"),
            &Layer::new("out.shp"),
        )
        .await
        .unwrap();

        let calls = engine.calls();
        assert_eq!(calls[4], "buffer bus_stops_clip.shp 300");
        assert!(calls[5].ends_with(" 800"));
    }

    #[tokio::test]
    async fn test_service_area_propagates_engine_failure() {
        let engine = RecordingEngine {
            fail_on: Some("merge"),
            ..Default::default()
        };

        let err = valid_service_area(
            &engine,
            &layers(),
            &BufferDistances::default(),
            Path::new("work"),
            &Layer::new("out.shp"),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, StudyError::Geoprocessing(_)));
        assert!(!engine.calls().iter().any(|c| c.starts_with("dissolve")));
    }

    #[tokio::test]
    async fn test_population_points_call_sequence() {
        let engine = RecordingEngine::default();

        let layers = population_points(
            &engine,
            &Layer::new("raw/pop.tif"),
            &Layer::new("raw/boundary.shp"),
            &Layer::new("out/valid_area.shp"),
            Path::new("out"),
        )
        .await
        .unwrap();

        assert_eq!(layers.total, Layer::new("out/population_all.tif"));
        assert_eq!(layers.served, Layer::new("out/population_valid.tif"));
        assert_eq!(layers.points, Layer::new("out/population_points.shp"));
        assert_eq!(
            engine.calls(),
            vec![
                "mask pop.tif+boundary.shp",
                "mask pop.tif+valid_area.shp",
                "raster_to_points population_valid.tif Value",
            ]
        );
    }

    #[tokio::test]
    async fn test_population_points_stops_on_mask_failure() {
        let engine = RecordingEngine {
            fail_on: Some("mask"),
            ..Default::default()
        };

        let err = population_points(
            &engine,
            &Layer::new("pop.tif"),
            &Layer::new("boundary.shp"),
            &Layer::new("valid_area.shp"),
            Path::new("out"),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, StudyError::Geoprocessing(_)));
        assert!(engine.calls().is_empty());
    }

    #[tokio::test]
    async fn test_spatial_join_through_trait_object() {
        let engine = RecordingEngine::default();
        let dyn_engine: &dyn GeoprocessingEngine = &engine;
        let output = Layer::new("out/joined.shp");

        let joined = dyn_engine
            .spatial_join(
                &Layer::new("points.shp"),
                &Layer::new("stops.shp"),
                Some(500.0),
                &output,
            )
            .await
            .unwrap();
        dyn_engine
            .spatial_join(&Layer::new("points.shp"), &Layer::new("area.shp"), None, &output)
            .await
            .unwrap();

        assert_eq!(joined, output);
        assert_eq!(
            engine.calls(),
            vec!["join points.shp+stops.shp 500", "join points.shp+area.shp intersect"]
        );
    }
}
