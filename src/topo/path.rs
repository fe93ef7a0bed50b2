//! Canonical node addressing
//!
//! Every node in the topology graph is addressed by a [`ResourcePath`]: an
//! alternating sequence of fixed kind keywords and quoted resource names,
//! rendered as one dot-joined identifier (`namespace.'team-a'.ingress.'web'`).
//! The rendered string doubles as the graph key, so rendering must be
//! deterministic and injective: two distinct segment sequences must never
//! collapse to the same identifier.

use std::fmt;

/// Resource kind keywords that appear as path segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindTag {
    Namespace,
    Ingress,
    Rule,
    Service,
    Deployment,
    StatefulSet,
    DaemonSet,
    ConfigMap,
    Secret,
    Hpa,
    Pdb,
    Pvc,
}

impl KindTag {
    /// The fixed keyword used for this kind in rendered paths.
    pub fn token(self) -> &'static str {
        match self {
            KindTag::Namespace => "namespace",
            KindTag::Ingress => "ingress",
            KindTag::Rule => "rule",
            KindTag::Service => "service",
            KindTag::Deployment => "deployment",
            KindTag::StatefulSet => "statefulSet",
            KindTag::DaemonSet => "daemonSet",
            KindTag::ConfigMap => "configMap",
            KindTag::Secret => "secret",
            KindTag::Hpa => "hpa",
            KindTag::Pdb => "pdb",
            KindTag::Pvc => "pvc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Kind(KindTag),
    Name(String),
}

/// Canonical hierarchical identifier of one topology node.
///
/// Name segments are single-quoted so names containing `.` or spaces cannot
/// be confused with the separator; an embedded quote is doubled, keeping the
/// quoting injective with respect to both the separator and the quote
/// character. Kind keywords are never quoted and never collide with quoted
/// names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePath {
    segments: Vec<Segment>,
}

impl ResourcePath {
    /// Root of a namespace subtree: `namespace.'<name>'`.
    pub fn namespace(name: &str) -> Self {
        Self {
            segments: vec![
                Segment::Kind(KindTag::Namespace),
                Segment::Name(name.to_string()),
            ],
        }
    }

    /// Append a named child: `<self>.<kind>.'<name>'`.
    pub fn child(&self, kind: KindTag, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Kind(kind));
        segments.push(Segment::Name(name.to_string()));
        Self { segments }
    }

    /// Append a bare kind-group segment: `<self>.<kind>`.
    ///
    /// Used for rule addressing (`ingress.rule.'<host>'`) and for layout
    /// hints that target a whole kind group rather than a single resource.
    pub fn group(&self, kind: KindTag) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Kind(kind));
        Self { segments }
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            match segment {
                Segment::Kind(kind) => f.write_str(kind.token())?,
                Segment::Name(name) => write!(f, "'{}'", name.replace('\'', "''"))?,
            }
        }
        Ok(())
    }
}
