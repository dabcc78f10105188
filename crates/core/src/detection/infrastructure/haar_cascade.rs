use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CascadeError {
    #[error("failed to read cascade {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed cascade XML: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("missing element <{0}>")]
    MissingElement(String),
    #[error("invalid number {value:?} in <{element}>")]
    InvalidNumber { element: String, value: String },
    #[error("legacy cascade layout is not supported; re-save it with OpenCV 2.4 or later")]
    LegacyFormat,
    #[error("unsupported {kind}: {value}")]
    Unsupported { kind: &'static str, value: String },
    #[error("invalid cascade: {0}")]
    Invalid(String),
}

/// One weighted rectangle of a Haar feature, in window coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HaarRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub weight: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HaarFeature {
    pub rects: Vec<HaarRect>,
}

/// Split node of a weak classifier tree.
///
/// A child index `> 0` points at another node of the same tree; `<= 0`
/// selects leaf `-child`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TreeNode {
    pub left: i32,
    pub right: i32,
    pub feature: usize,
    pub threshold: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WeakClassifier {
    pub nodes: Vec<TreeNode>,
    pub leaves: Vec<f32>,
}

impl WeakClassifier {
    /// Walks the tree from the root and returns the reached leaf value.
    pub fn evaluate(&self, feature_value: impl Fn(usize) -> f32) -> f32 {
        let mut idx = 0usize;
        loop {
            let node = &self.nodes[idx];
            let child = if feature_value(node.feature) < node.threshold {
                node.left
            } else {
                node.right
            };
            if child <= 0 {
                return self.leaves[(-child) as usize];
            }
            idx = child as usize;
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Stage {
    pub threshold: f32,
    pub classifiers: Vec<WeakClassifier>,
}

/// A boosted Haar cascade as trained by OpenCV.
///
/// Immutable once loaded; share it behind an `Arc` between detectors.
#[derive(Clone, Debug, PartialEq)]
pub struct HaarCascade {
    window_width: u32,
    window_height: u32,
    stages: Vec<Stage>,
    features: Vec<HaarFeature>,
}

impl HaarCascade {
    pub fn new(
        window_width: u32,
        window_height: u32,
        stages: Vec<Stage>,
        features: Vec<HaarFeature>,
    ) -> Result<Self, CascadeError> {
        let cascade = Self {
            window_width,
            window_height,
            stages,
            features,
        };
        cascade.validate()?;
        Ok(cascade)
    }

    pub fn load(path: &Path) -> Result<Self, CascadeError> {
        let xml = fs::read_to_string(path).map_err(|e| CascadeError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let cascade = Self::from_xml_str(&xml)?;
        log::debug!(
            "Loaded cascade {} ({}x{} window, {} stages, {} features)",
            path.display(),
            cascade.window_width,
            cascade.window_height,
            cascade.stages.len(),
            cascade.features.len()
        );
        Ok(cascade)
    }

    /// Parses the OpenCV 2.4+ `opencv-cascade-classifier` XML layout.
    pub fn from_xml_str(xml: &str) -> Result<Self, CascadeError> {
        let doc = roxmltree::Document::parse(xml)?;
        let root = doc.root_element();

        let Some(cascade) = element(root, "cascade") else {
            let legacy = root
                .children()
                .filter(|n| n.is_element())
                .any(|n| n.attribute("type_id") == Some("opencv-haar-classifier"));
            return Err(if legacy {
                CascadeError::LegacyFormat
            } else {
                CascadeError::MissingElement("cascade".to_string())
            });
        };

        let stage_type = required_text(cascade, "stageType")?;
        if stage_type != "BOOST" {
            return Err(CascadeError::Unsupported {
                kind: "stage type",
                value: stage_type.to_string(),
            });
        }
        let feature_type = required_text(cascade, "featureType")?;
        if feature_type != "HAAR" {
            return Err(CascadeError::Unsupported {
                kind: "feature type",
                value: feature_type.to_string(),
            });
        }
        if let Some(params) = element(cascade, "featureParams") {
            if let Some(cats) = element(params, "maxCatCount") {
                let count: u32 = parse_one(cats)?;
                if count > 0 {
                    return Err(CascadeError::Unsupported {
                        kind: "categorical features",
                        value: count.to_string(),
                    });
                }
            }
        }

        let window_width: u32 = parse_one(required(cascade, "width")?)?;
        let window_height: u32 = parse_one(required(cascade, "height")?)?;

        let stages = items(required(cascade, "stages")?)
            .map(parse_stage)
            .collect::<Result<Vec<_>, _>>()?;
        let features = items(required(cascade, "features")?)
            .map(parse_feature)
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(window_width, window_height, stages, features)
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn features(&self) -> &[HaarFeature] {
        &self.features
    }

    fn validate(&self) -> Result<(), CascadeError> {
        if self.window_width < 3 || self.window_height < 3 {
            return Err(CascadeError::Invalid(format!(
                "window {}x{} is too small",
                self.window_width, self.window_height
            )));
        }
        if self.stages.is_empty() {
            return Err(CascadeError::Invalid("no stages".to_string()));
        }

        for (fi, feature) in self.features.iter().enumerate() {
            if feature.rects.is_empty() || feature.rects.len() > 3 {
                return Err(CascadeError::Invalid(format!(
                    "feature {fi} has {} rectangles",
                    feature.rects.len()
                )));
            }
            for r in &feature.rects {
                if r.x.saturating_add(r.width) > self.window_width
                    || r.y.saturating_add(r.height) > self.window_height
                {
                    return Err(CascadeError::Invalid(format!(
                        "feature {fi} extends outside the {}x{} window",
                        self.window_width, self.window_height
                    )));
                }
            }
        }

        for (si, stage) in self.stages.iter().enumerate() {
            for weak in &stage.classifiers {
                validate_tree(weak, self.features.len())
                    .map_err(|msg| CascadeError::Invalid(format!("stage {si}: {msg}")))?;
            }
        }
        Ok(())
    }
}

fn validate_tree(weak: &WeakClassifier, feature_count: usize) -> Result<(), String> {
    if weak.nodes.is_empty() {
        return Err("weak classifier without nodes".to_string());
    }
    for (ni, node) in weak.nodes.iter().enumerate() {
        if node.feature >= feature_count {
            return Err(format!("node references missing feature {}", node.feature));
        }
        for child in [node.left, node.right] {
            if child > 0 {
                // Children come after their parent, so walks always terminate
                if child as usize <= ni || child as usize >= weak.nodes.len() {
                    return Err(format!("node {ni} has invalid child {child}"));
                }
            } else if (-child) as usize >= weak.leaves.len() {
                return Err(format!("node {ni} references missing leaf {}", -child));
            }
        }
    }
    Ok(())
}

fn parse_stage(node: roxmltree::Node) -> Result<Stage, CascadeError> {
    let threshold: f32 = parse_one(required(node, "stageThreshold")?)?;
    let classifiers = items(required(node, "weakClassifiers")?)
        .map(parse_weak_classifier)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Stage {
        threshold,
        classifiers,
    })
}

fn parse_weak_classifier(node: roxmltree::Node) -> Result<WeakClassifier, CascadeError> {
    let raw: Vec<f64> = parse_list(required(node, "internalNodes")?)?;
    if raw.is_empty() || raw.len() % 4 != 0 {
        return Err(CascadeError::Invalid(format!(
            "internalNodes holds {} values, expected groups of 4",
            raw.len()
        )));
    }
    let nodes = raw
        .chunks_exact(4)
        .map(|c| TreeNode {
            left: c[0] as i32,
            right: c[1] as i32,
            feature: c[2].max(0.0) as usize,
            threshold: c[3] as f32,
        })
        .collect();
    let leaves = parse_list(required(node, "leafValues")?)?;
    Ok(WeakClassifier { nodes, leaves })
}

fn parse_feature(node: roxmltree::Node) -> Result<HaarFeature, CascadeError> {
    if let Some(tilted) = element(node, "tilted") {
        let flag: u32 = parse_one(tilted)?;
        if flag != 0 {
            return Err(CascadeError::Unsupported {
                kind: "feature",
                value: "tilted".to_string(),
            });
        }
    }
    let rects = items(required(node, "rects")?)
        .map(|r| {
            let v: Vec<f64> = parse_list(r)?;
            if v.len() != 5 || v[..4].iter().any(|&c| c < 0.0) {
                return Err(CascadeError::Invalid(format!(
                    "feature rectangle {:?} must be 'x y width height weight'",
                    text(r)
                )));
            }
            Ok(HaarRect {
                x: v[0] as u32,
                y: v[1] as u32,
                width: v[2] as u32,
                height: v[3] as u32,
                weight: v[4] as f32,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(HaarFeature { rects })
}

fn element<'a, 'input>(
    node: roxmltree::Node<'a, 'input>,
    name: &str,
) -> Option<roxmltree::Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

fn required<'a, 'input>(
    node: roxmltree::Node<'a, 'input>,
    name: &str,
) -> Result<roxmltree::Node<'a, 'input>, CascadeError> {
    element(node, name).ok_or_else(|| CascadeError::MissingElement(name.to_string()))
}

fn required_text<'a>(node: roxmltree::Node<'a, '_>, name: &str) -> Result<&'a str, CascadeError> {
    Ok(text(required(node, name)?))
}

/// The `<_>` children OpenCV uses for sequence items.
fn items<'a, 'input>(
    node: roxmltree::Node<'a, 'input>,
) -> impl Iterator<Item = roxmltree::Node<'a, 'input>> {
    node.children()
        .filter(|n| n.is_element() && n.tag_name().name() == "_")
}

fn text<'a>(node: roxmltree::Node<'a, '_>) -> &'a str {
    node.text().unwrap_or("").trim()
}

fn parse_one<T: std::str::FromStr>(node: roxmltree::Node) -> Result<T, CascadeError> {
    let value = text(node);
    value.parse().map_err(|_| CascadeError::InvalidNumber {
        element: node.tag_name().name().to_string(),
        value: value.to_string(),
    })
}

fn parse_list<T: std::str::FromStr>(node: roxmltree::Node) -> Result<Vec<T>, CascadeError> {
    text(node)
        .split_whitespace()
        .map(|token| {
            token.parse().map_err(|_| CascadeError::InvalidNumber {
                element: node.tag_name().name().to_string(),
                value: token.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Two-stage 4x4 cascade: bright upper half over dark lower half.
    pub(crate) const TINY_CASCADE: &str = r#"<?xml version="1.0"?>
<opencv_storage>
<cascade type_id="opencv-cascade-classifier"><stageType>BOOST</stageType>
  <featureType>HAAR</featureType>
  <height>4</height>
  <width>4</width>
  <stageParams>
    <maxWeakCount>1</maxWeakCount></stageParams>
  <featureParams>
    <maxCatCount>0</maxCatCount></featureParams>
  <stageNum>2</stageNum>
  <stages>
    <_>
      <maxWeakCount>1</maxWeakCount>
      <stageThreshold>0.</stageThreshold>
      <weakClassifiers>
        <_>
          <internalNodes>
            0 -1 0 1.0000000000000000e-01</internalNodes>
          <leafValues>
            -1. 1.</leafValues></_></weakClassifiers></_>
    <_>
      <maxWeakCount>2</maxWeakCount>
      <stageThreshold>-5.0000000000000000e-01</stageThreshold>
      <weakClassifiers>
        <_>
          <internalNodes>
            0 -1 1 0.</internalNodes>
          <leafValues>
            -1. 5.0000000000000000e-01</leafValues></_>
        <_>
          <internalNodes>
            1 -1 0 5.0000000000000000e-01 0 -2 1 0.</internalNodes>
          <leafValues>
            -2. 0. 1.</leafValues></_></weakClassifiers></_></stages>
  <features>
    <_>
      <rects>
        <_>
          0 0 4 2 1.</_>
        <_>
          0 2 4 2 -1.</_></rects></_>
    <_>
      <rects>
        <_>
          0 0 4 4 -1.</_>
        <_>
          1 1 2 2 4.</_></rects>
      <tilted>0</tilted></_></features></cascade>
</opencv_storage>
"#;

    #[test]
    fn test_parses_window_stages_and_features() {
        let cascade = HaarCascade::from_xml_str(TINY_CASCADE).unwrap();
        assert_eq!(cascade.window_size(), (4, 4));
        assert_eq!(cascade.stages().len(), 2);
        assert_eq!(cascade.stages()[1].classifiers.len(), 2);
        assert_eq!(cascade.features().len(), 2);
        assert_eq!(
            cascade.features()[0].rects[1],
            HaarRect {
                x: 0,
                y: 2,
                width: 4,
                height: 2,
                weight: -1.0
            }
        );
        assert_relative_eq!(cascade.stages()[1].threshold, -0.5);
    }

    #[test]
    fn test_parses_multi_node_tree() {
        let cascade = HaarCascade::from_xml_str(TINY_CASCADE).unwrap();
        let tree = &cascade.stages()[1].classifiers[1];
        assert_eq!(tree.nodes.len(), 2);
        assert_eq!(tree.nodes[0].left, 1);
        assert_eq!(tree.nodes[1].right, -2);
        assert_eq!(tree.leaves, vec![-2.0, 0.0, 1.0]);
    }

    #[test]
    fn test_stump_evaluation_picks_leaf_by_threshold() {
        let cascade = HaarCascade::from_xml_str(TINY_CASCADE).unwrap();
        let stump = &cascade.stages()[0].classifiers[0];
        assert_relative_eq!(stump.evaluate(|_| 0.0), -1.0);
        assert_relative_eq!(stump.evaluate(|_| 0.5), 1.0);
    }

    #[test]
    fn test_tree_evaluation_follows_internal_child() {
        let cascade = HaarCascade::from_xml_str(TINY_CASCADE).unwrap();
        let tree = &cascade.stages()[1].classifiers[1];
        // root: f0 < 0.5 -> node 1; node 1: f1 < 0 -> leaf 0 else leaf 2
        assert_relative_eq!(tree.evaluate(|f| if f == 0 { 0.0 } else { -1.0 }), -2.0);
        assert_relative_eq!(tree.evaluate(|f| if f == 0 { 0.0 } else { 1.0 }), 1.0);
        // root: f0 >= 0.5 -> leaf 1
        assert_relative_eq!(tree.evaluate(|_| 0.9), 0.0);
    }

    #[test]
    fn test_legacy_layout_is_rejected() {
        let xml = r#"<opencv_storage>
            <haarcascade_frontalface type_id="opencv-haar-classifier">
              <size>24 24</size><stages></stages>
            </haarcascade_frontalface></opencv_storage>"#;
        assert!(matches!(
            HaarCascade::from_xml_str(xml),
            Err(CascadeError::LegacyFormat)
        ));
    }

    #[test]
    fn test_lbp_cascade_is_rejected() {
        let xml = TINY_CASCADE.replace("<featureType>HAAR", "<featureType>LBP");
        assert!(matches!(
            HaarCascade::from_xml_str(&xml),
            Err(CascadeError::Unsupported { kind: "feature type", .. })
        ));
    }

    #[test]
    fn test_tilted_feature_is_rejected() {
        let xml = TINY_CASCADE.replace("<tilted>0</tilted>", "<tilted>1</tilted>");
        assert!(matches!(
            HaarCascade::from_xml_str(&xml),
            Err(CascadeError::Unsupported { kind: "feature", .. })
        ));
    }

    #[test]
    fn test_missing_features_element() {
        let start = TINY_CASCADE.find("<features>").unwrap();
        let end = TINY_CASCADE.find("</features>").unwrap() + "</features>".len();
        let xml = format!("{}{}", &TINY_CASCADE[..start], &TINY_CASCADE[end..]);
        assert!(matches!(
            HaarCascade::from_xml_str(&xml),
            Err(CascadeError::MissingElement(name)) if name == "features"
        ));
    }

    #[test]
    fn test_invalid_number_reports_element() {
        let xml = TINY_CASCADE.replace("<width>4</width>", "<width>four</width>");
        match HaarCascade::from_xml_str(&xml) {
            Err(CascadeError::InvalidNumber { element, value }) => {
                assert_eq!(element, "width");
                assert_eq!(value, "four");
            }
            other => panic!("expected InvalidNumber, got {other:?}"),
        }
    }

    #[test]
    fn test_feature_outside_window_is_invalid() {
        let xml = TINY_CASCADE.replace("0 2 4 2 -1.", "0 3 4 2 -1.");
        assert!(matches!(
            HaarCascade::from_xml_str(&xml),
            Err(CascadeError::Invalid(_))
        ));
    }

    #[test]
    fn test_missing_leaf_is_invalid() {
        let xml = TINY_CASCADE.replace("-2. 0. 1.", "-2. 0.");
        assert!(matches!(
            HaarCascade::from_xml_str(&xml),
            Err(CascadeError::Invalid(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = HaarCascade::load(Path::new("/nonexistent/cascade.xml")).unwrap_err();
        assert!(matches!(err, CascadeError::Io { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.xml");
        fs::write(&path, TINY_CASCADE).unwrap();
        assert_eq!(
            HaarCascade::load(&path).unwrap(),
            HaarCascade::from_xml_str(TINY_CASCADE).unwrap()
        );
    }
}
