//! Body landmark types.
//!
//! A pose detector emits a fixed-length ordered list of 33 points per
//! frame. Each point is identified by its position in that list; this
//! module gives every position a name and stores a frame's points so they
//! can be looked up by name. A name appears at most once per frame.

use serde::{Deserialize, Serialize};

/// Body side for paired joints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Both sides, left first.
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// The 33-entry landmark vocabulary, in detector output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(usize)]
pub enum LandmarkName {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl LandmarkName {
    /// Number of points the detector emits per frame.
    pub const COUNT: usize = 33;

    /// All names in detector order.
    pub const ALL: [LandmarkName; Self::COUNT] = [
        Self::Nose,
        Self::LeftEyeInner,
        Self::LeftEye,
        Self::LeftEyeOuter,
        Self::RightEyeInner,
        Self::RightEye,
        Self::RightEyeOuter,
        Self::LeftEar,
        Self::RightEar,
        Self::MouthLeft,
        Self::MouthRight,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftPinky,
        Self::RightPinky,
        Self::LeftIndex,
        Self::RightIndex,
        Self::LeftThumb,
        Self::RightThumb,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
        Self::LeftHeel,
        Self::RightHeel,
        Self::LeftFootIndex,
        Self::RightFootIndex,
    ];

    /// Joints weighted more heavily when scoring frame confidence.
    pub const CRITICAL: [LandmarkName; 8] = [
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
    ];

    /// The anatomical points the angle engine reads.
    pub const TRACKED: [LandmarkName; 17] = [
        Self::Nose,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
        Self::LeftHeel,
        Self::RightHeel,
        Self::LeftFootIndex,
        Self::RightFootIndex,
    ];

    /// Position in the detector output list.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEyeInner => "left_eye_inner",
            Self::LeftEye => "left_eye",
            Self::LeftEyeOuter => "left_eye_outer",
            Self::RightEyeInner => "right_eye_inner",
            Self::RightEye => "right_eye",
            Self::RightEyeOuter => "right_eye_outer",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::MouthLeft => "mouth_left",
            Self::MouthRight => "mouth_right",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftPinky => "left_pinky",
            Self::RightPinky => "right_pinky",
            Self::LeftIndex => "left_index",
            Self::RightIndex => "right_index",
            Self::LeftThumb => "left_thumb",
            Self::RightThumb => "right_thumb",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
            Self::LeftHeel => "left_heel",
            Self::RightHeel => "right_heel",
            Self::LeftFootIndex => "left_foot_index",
            Self::RightFootIndex => "right_foot_index",
        }
    }

    pub fn is_critical(self) -> bool {
        Self::CRITICAL.contains(&self)
    }

    pub fn shoulder(side: Side) -> Self {
        match side {
            Side::Left => Self::LeftShoulder,
            Side::Right => Self::RightShoulder,
        }
    }

    pub fn elbow(side: Side) -> Self {
        match side {
            Side::Left => Self::LeftElbow,
            Side::Right => Self::RightElbow,
        }
    }

    pub fn wrist(side: Side) -> Self {
        match side {
            Side::Left => Self::LeftWrist,
            Side::Right => Self::RightWrist,
        }
    }

    pub fn hip(side: Side) -> Self {
        match side {
            Side::Left => Self::LeftHip,
            Side::Right => Self::RightHip,
        }
    }

    pub fn knee(side: Side) -> Self {
        match side {
            Side::Left => Self::LeftKnee,
            Side::Right => Self::RightKnee,
        }
    }

    pub fn ankle(side: Side) -> Self {
        match side {
            Side::Left => Self::LeftAnkle,
            Side::Right => Self::RightAnkle,
        }
    }

    pub fn foot_index(side: Side) -> Self {
        match side {
            Side::Left => Self::LeftFootIndex,
            Side::Right => Self::RightFootIndex,
        }
    }
}

impl std::fmt::Display for LandmarkName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coordinate space of a frame's `x`/`y`/`z` values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CoordinateSpace {
    /// `x`, `y` normalized to `[0.0, 1.0]` of the image; `z` is relative depth.
    #[default]
    Normalized,
    /// `x`, `y` in pixels of an image with the given dimensions.
    Pixel { width: u32, height: u32 },
    /// Metric coordinates (meters) centered on the hips.
    WorldMetric,
}

impl CoordinateSpace {
    /// Image height expressed in this space's units, if the space is
    /// image-anchored.
    pub fn image_height(&self) -> Option<f64> {
        match self {
            CoordinateSpace::Normalized => Some(1.0),
            CoordinateSpace::Pixel { height, .. } => Some(*height as f64),
            CoordinateSpace::WorldMetric => None,
        }
    }
}

/// One raw point from the detector output list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectorPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Visibility/confidence in `[0.0, 1.0]`.
    #[serde(default)]
    pub visibility: f64,
}

/// A named body-joint position with a visibility score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub name: LandmarkName,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Visibility/confidence in `[0.0, 1.0]`.
    pub visibility: f64,
    /// Set when the point was synthesized from neighbouring joints.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub interpolated: bool,
}

impl Landmark {
    pub fn new(name: LandmarkName, x: f64, y: f64, z: f64, visibility: f64) -> Self {
        Self {
            name,
            x,
            y,
            z,
            visibility: unit_visibility(visibility),
            interpolated: false,
        }
    }

    /// Position as an `[x, y, z]` triple.
    pub fn position(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Visibility clamped to `[0, 1]`. Non-finite scores count as not visible.
fn unit_visibility(visibility: f64) -> f64 {
    if visibility.is_finite() {
        visibility.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// All landmarks detected in one frame.
///
/// Points are stored in detector order and looked up by name. An optional
/// world frame carries the metric counterpart of the same points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "LandmarkFrameRepr", from = "LandmarkFrameRepr")]
pub struct LandmarkFrame {
    coordinate_space: CoordinateSpace,
    slots: [Option<Landmark>; LandmarkName::COUNT],
    world: Option<Box<LandmarkFrame>>,
}

impl LandmarkFrame {
    /// An empty frame in the given coordinate space.
    pub fn new(coordinate_space: CoordinateSpace) -> Self {
        Self {
            coordinate_space,
            slots: [None; LandmarkName::COUNT],
            world: None,
        }
    }

    /// Build a frame from named landmarks. A repeated name keeps the last point.
    pub fn from_landmarks(
        coordinate_space: CoordinateSpace,
        landmarks: impl IntoIterator<Item = Landmark>,
    ) -> Self {
        let mut frame = Self::new(coordinate_space);
        for landmark in landmarks {
            frame.insert(landmark);
        }
        frame
    }

    /// Build a frame from the detector's ordered output list.
    ///
    /// Position `i` is named by `LandmarkName::from_index(i)`; positions past
    /// the vocabulary are ignored.
    pub fn from_detector_output(coordinate_space: CoordinateSpace, points: &[DetectorPoint]) -> Self {
        if points.len() > LandmarkName::COUNT {
            tracing::debug!(
                count = points.len(),
                "Detector output longer than landmark vocabulary; extra points ignored"
            );
        }
        Self::from_landmarks(
            coordinate_space,
            points.iter().enumerate().filter_map(|(i, p)| {
                LandmarkName::from_index(i)
                    .map(|name| Landmark::new(name, p.x, p.y, p.z, p.visibility))
            }),
        )
    }

    /// Attach the metric (world) counterpart of this frame.
    pub fn with_world(mut self, world: LandmarkFrame) -> Self {
        self.world = Some(Box::new(world));
        self
    }

    /// Insert a landmark, returning the point it replaced, if any.
    pub fn insert(&mut self, landmark: Landmark) -> Option<Landmark> {
        let previous = self.slots[landmark.name.index()].replace(landmark);
        if previous.is_some() {
            tracing::debug!(name = %landmark.name, "Duplicate landmark replaced");
        }
        previous
    }

    pub fn get(&self, name: LandmarkName) -> Option<&Landmark> {
        self.slots[name.index()].as_ref()
    }

    pub fn contains(&self, name: LandmarkName) -> bool {
        self.slots[name.index()].is_some()
    }

    /// Landmarks in detector order.
    pub fn iter(&self) -> impl Iterator<Item = &Landmark> {
        self.slots.iter().flatten()
    }

    /// Number of landmarks present.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn coordinate_space(&self) -> CoordinateSpace {
        self.coordinate_space
    }

    pub fn world(&self) -> Option<&LandmarkFrame> {
        self.world.as_deref()
    }

    /// A copy of this frame keeping only the landmarks accepted by `keep`.
    /// The world frame is filtered with the same predicate.
    pub fn filtered(&self, mut keep: impl FnMut(&Landmark) -> bool) -> Self {
        let mut filter = |source: &LandmarkFrame| {
            let mut out = Self::new(source.coordinate_space);
            for landmark in source.iter().filter(|l| keep(l)) {
                out.insert(*landmark);
            }
            out
        };
        let mut frame = filter(self);
        frame.world = self.world.as_deref().map(|world| Box::new(filter(world)));
        frame
    }
}

impl Default for LandmarkFrame {
    fn default() -> Self {
        Self::new(CoordinateSpace::default())
    }
}

/// Serialized form of a [`LandmarkFrame`]: a flat list of named points.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LandmarkFrameRepr {
    #[serde(default)]
    coordinate_space: CoordinateSpace,
    landmarks: Vec<Landmark>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    world: Option<Box<LandmarkFrameRepr>>,
}

impl From<LandmarkFrame> for LandmarkFrameRepr {
    fn from(frame: LandmarkFrame) -> Self {
        Self {
            coordinate_space: frame.coordinate_space,
            landmarks: frame.iter().copied().collect(),
            world: frame.world.map(|w| Box::new(LandmarkFrameRepr::from(*w))),
        }
    }
}

impl From<LandmarkFrameRepr> for LandmarkFrame {
    fn from(repr: LandmarkFrameRepr) -> Self {
        let landmarks = repr.landmarks.into_iter().map(|l| Landmark {
            visibility: unit_visibility(l.visibility),
            ..l
        });
        let mut frame = LandmarkFrame::from_landmarks(repr.coordinate_space, landmarks);
        frame.world = repr.world.map(|w| Box::new(LandmarkFrame::from(*w)));
        frame
    }
}
