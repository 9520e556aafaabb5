use anyhow::{anyhow, bail, Context, Result};
use geojson::{GeoJson, Geometry, Value};
use rayon::prelude::*;
use simd_json::prelude::*;
use std::fs;
use std::path::Path;

use crate::map::renderer::LineString;
use crate::map::{BaseMap, Lod, ProjectionConfig};

/// One map catalog entry: display metadata plus the declarative projection
/// the map image was drawn in.
#[derive(Clone, Debug)]
pub struct MapInfo {
    pub name: String,
    pub author: String,
    pub license: String,
    /// Map image width/height
    pub aspect_ratio: f64,
    pub projection: ProjectionConfig,
}

/// Built-in catalog used when no `maps.json` is present.
pub fn default_maps() -> Vec<MapInfo> {
    vec![
        MapInfo {
            name: "World (cylindrical)".to_string(),
            author: "Natural Earth".to_string(),
            license: "public domain".to_string(),
            aspect_ratio: 2.0,
            projection: ProjectionConfig::Cylindrical {
                top_latitude: 82.0,
                bottom_latitude: -82.0,
                central_meridian: 0.0,
            },
        },
        MapInfo {
            name: "Arctic (azimuthal)".to_string(),
            author: "Natural Earth".to_string(),
            license: "public domain".to_string(),
            aspect_ratio: 1.0,
            projection: ProjectionConfig::Azimuthal {
                center_longitude: 0.0,
                center_latitude: 90.0,
            },
        },
    ]
}

/// Parse the map catalog (a JSON array of map entries).
pub fn load_map_catalog(path: &Path) -> Result<Vec<MapInfo>> {
    let mut bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let value = simd_json::to_owned_value(&mut bytes)
        .with_context(|| format!("parsing {}", path.display()))?;

    let entries = value
        .as_array()
        .ok_or_else(|| anyhow!("map catalog must be a JSON array"))?;

    let mut maps = Vec::with_capacity(entries.len());
    for entry in entries {
        maps.push(parse_map_entry(entry)?);
    }
    if maps.is_empty() {
        bail!("map catalog is empty");
    }
    Ok(maps)
}

fn parse_map_entry(entry: &simd_json::OwnedValue) -> Result<MapInfo> {
    let name = entry
        .get("name")
        .and_then(|v| v.as_str())
        .unwrap_or("Unnamed map")
        .to_string();
    let author = entry
        .get("author")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown")
        .to_string();
    let license = entry
        .get("license")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown")
        .to_string();
    // cast_f64 rather than as_f64: integer JSON numbers are the common
    // way to write whole-degree latitudes
    let aspect_ratio = entry
        .get("aspect_ratio")
        .and_then(|v| v.cast_f64())
        .unwrap_or(2.0);

    let proj = entry
        .get("projection")
        .ok_or_else(|| anyhow!("map entry {:?} has no projection", name))?;
    let kind = proj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow!("projection of {:?} has no type tag", name))?;

    let field = |key: &str| -> Result<f64> {
        proj.get(key)
            .and_then(|v| v.cast_f64())
            .ok_or_else(|| anyhow!("projection of {:?} is missing {}", name, key))
    };

    let projection = match kind {
        "cylindrical" => ProjectionConfig::Cylindrical {
            top_latitude: field("top_latitude")?,
            bottom_latitude: field("bottom_latitude")?,
            central_meridian: field("central_meridian")?,
        },
        "azimuthal" => ProjectionConfig::Azimuthal {
            center_longitude: field("center_longitude")?,
            center_latitude: field("center_latitude")?,
        },
        other => bail!("unknown projection type {:?} in map {:?}", other, name),
    };

    Ok(MapInfo {
        name,
        author,
        license,
        aspect_ratio,
        projection,
    })
}

/// Load all available Natural Earth coastline data into the base map.
/// Files are independent, so they parse in parallel.
pub fn load_basemap(basemap: &mut BaseMap, data_dir: &Path) -> Result<()> {
    let coastline_files = [
        ("ne_110m_coastline.json", Lod::Low),
        ("ne_50m_coastline.json", Lod::Medium),
        ("ne_10m_coastline.json", Lod::High),
    ];

    let loaded: Vec<(Lod, Vec<LineString>)> = coastline_files
        .par_iter()
        .filter_map(|&(filename, lod)| {
            let path = data_dir.join(filename);
            if !path.exists() {
                return None;
            }
            match load_coastline_file(&path) {
                Ok(lines) => Some((lod, lines)),
                Err(e) => {
                    eprintln!("Warning: Failed to load {}: {}", filename, e);
                    None
                }
            }
        })
        .collect();

    for (lod, lines) in loaded {
        for line in lines {
            basemap.add_coastline(line, lod);
        }
    }

    Ok(())
}

fn load_coastline_file(path: &Path) -> Result<Vec<LineString>> {
    let content = fs::read_to_string(path)?;
    let geojson: GeoJson = content.parse()?;
    let mut lines = Vec::new();
    process_geojson_lines(&geojson, |line| lines.push(line));
    Ok(lines)
}

/// Process GeoJSON and extract line features
fn process_geojson_lines<F>(geojson: &GeoJson, mut add_line: F)
where
    F: FnMut(LineString),
{
    match geojson {
        GeoJson::FeatureCollection(fc) => {
            for feature in &fc.features {
                if let Some(ref geometry) = feature.geometry {
                    process_geometry_lines(geometry, &mut add_line);
                }
            }
        }
        GeoJson::Feature(f) => {
            if let Some(ref geometry) = f.geometry {
                process_geometry_lines(geometry, &mut add_line);
            }
        }
        GeoJson::Geometry(geometry) => {
            process_geometry_lines(geometry, &mut add_line);
        }
    }
}

fn process_geometry_lines<F>(geometry: &Geometry, add_line: &mut F)
where
    F: FnMut(LineString),
{
    match &geometry.value {
        Value::LineString(coords) => {
            add_line(coords.iter().map(|c| (c[0], c[1])).collect());
        }
        Value::MultiLineString(lines) => {
            for coords in lines {
                add_line(coords.iter().map(|c| (c[0], c[1])).collect());
            }
        }
        Value::Polygon(rings) => {
            if let Some(exterior) = rings.first() {
                add_line(exterior.iter().map(|c| (c[0], c[1])).collect());
            }
        }
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                if let Some(exterior) = rings.first() {
                    add_line(exterior.iter().map(|c| (c[0], c[1])).collect());
                }
            }
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                process_geometry_lines(g, add_line);
            }
        }
        _ => {}
    }
}

/// Rough continent outlines used as Low LOD fallback when no data file is
/// available.
pub fn generate_simple_world(basemap: &mut BaseMap) {
    // North America
    basemap.add_coastline(
        vec![
            (-168.0, 65.0), (-141.0, 60.0), (-125.0, 48.0), (-117.0, 32.0),
            (-97.0, 25.0), (-82.0, 24.0), (-81.0, 31.0), (-70.0, 41.0),
            (-65.0, 47.0), (-52.0, 47.0), (-58.0, 55.0), (-73.0, 62.0),
            (-95.0, 62.0), (-130.0, 70.0), (-168.0, 65.0),
        ],
        Lod::Low,
    );

    // South America
    basemap.add_coastline(
        vec![
            (-80.0, 10.0), (-60.0, 5.0), (-35.0, -5.0), (-40.0, -22.0),
            (-55.0, -34.0), (-68.0, -50.0), (-75.0, -52.0), (-72.0, -30.0),
            (-70.0, -15.0), (-80.0, 0.0), (-80.0, 10.0),
        ],
        Lod::Low,
    );

    // Europe
    basemap.add_coastline(
        vec![
            (-10.0, 36.0), (0.0, 38.0), (10.0, 44.0), (20.0, 40.0),
            (30.0, 40.0), (40.0, 43.0), (40.0, 55.0), (25.0, 65.0),
            (10.0, 71.0), (5.0, 58.0), (-10.0, 52.0), (-5.0, 43.0),
            (-10.0, 36.0),
        ],
        Lod::Low,
    );

    // Africa
    basemap.add_coastline(
        vec![
            (-17.0, 15.0), (-10.0, 5.0), (10.0, 5.0), (25.0, -10.0),
            (35.0, -25.0), (20.0, -35.0), (10.0, -15.0), (5.0, 5.0),
            (-17.0, 15.0), (-15.0, 28.0), (10.0, 37.0), (30.0, 31.0),
            (35.0, 20.0), (50.0, 12.0), (40.0, 0.0), (35.0, -25.0),
        ],
        Lod::Low,
    );

    // Asia
    basemap.add_coastline(
        vec![
            (40.0, 43.0), (60.0, 25.0), (75.0, 15.0), (80.0, 8.0),
            (88.0, 22.0), (105.0, 10.0), (120.0, 22.0), (125.0, 30.0),
            (140.0, 40.0), (145.0, 50.0), (135.0, 55.0), (110.0, 45.0),
            (90.0, 50.0), (60.0, 55.0), (40.0, 43.0),
        ],
        Lod::Low,
    );

    // Australia
    basemap.add_coastline(
        vec![
            (115.0, -20.0), (130.0, -12.0), (145.0, -15.0), (153.0, -30.0),
            (145.0, -38.0), (130.0, -32.0), (115.0, -35.0), (115.0, -20.0),
        ],
        Lod::Low,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_maps_cover_both_projections() {
        let maps = default_maps();
        assert!(maps
            .iter()
            .any(|m| matches!(m.projection, ProjectionConfig::Cylindrical { .. })));
        assert!(maps
            .iter()
            .any(|m| matches!(m.projection, ProjectionConfig::Azimuthal { .. })));
    }

    #[test]
    fn test_parse_map_entry() {
        let mut raw = br#"
        [{
            "name": "Test map",
            "author": "someone",
            "license": "CC BY-SA 3.0",
            "aspect_ratio": 1.5,
            "projection": {
                "type": "cylindrical",
                "top_latitude": 82,
                "bottom_latitude": -82,
                "central_meridian": 10
            }
        }]
        "#
        .to_vec();
        let value = simd_json::to_owned_value(&mut raw).unwrap();
        let entry = &value.as_array().unwrap()[0];
        let info = parse_map_entry(entry).unwrap();
        assert_eq!(info.name, "Test map");
        assert_eq!(info.aspect_ratio, 1.5);
        match info.projection {
            ProjectionConfig::Cylindrical {
                top_latitude,
                central_meridian,
                ..
            } => {
                assert_eq!(top_latitude, 82.0);
                assert_eq!(central_meridian, 10.0);
            }
            _ => panic!("wrong projection kind"),
        }
    }

    #[test]
    fn test_parse_map_entry_integer_numbers() {
        // Whole numbers arrive as JSON integers, not floats; they must not
        // read as missing fields
        let mut raw = br#"
        [{
            "name": "Polar",
            "aspect_ratio": 1,
            "projection": {
                "type": "azimuthal",
                "center_longitude": 0,
                "center_latitude": 90
            }
        }]
        "#
        .to_vec();
        let value = simd_json::to_owned_value(&mut raw).unwrap();
        let entry = &value.as_array().unwrap()[0];
        let info = parse_map_entry(entry).unwrap();
        assert_eq!(info.aspect_ratio, 1.0);
        match info.projection {
            ProjectionConfig::Azimuthal {
                center_longitude,
                center_latitude,
            } => {
                assert_eq!(center_longitude, 0.0);
                assert_eq!(center_latitude, 90.0);
            }
            _ => panic!("wrong projection kind"),
        }
    }

    #[test]
    fn test_parse_map_entry_rejects_unknown_projection() {
        let mut raw = br#"[{"name": "x", "projection": {"type": "conic"}}]"#.to_vec();
        let value = simd_json::to_owned_value(&mut raw).unwrap();
        let entry = &value.as_array().unwrap()[0];
        assert!(parse_map_entry(entry).is_err());
    }

    #[test]
    fn test_simple_world_has_data() {
        let mut basemap = BaseMap::new();
        generate_simple_world(&mut basemap);
        assert!(basemap.has_data());
    }
}
