//! 视觉层：标签、图像解码与统计、分类模型抽象与实现、启发式降级

pub mod heuristic;
pub mod labels;
pub mod mock;
pub mod preprocess;
pub mod remote;
pub mod traits;

pub use heuristic::{match_rule, HeuristicClassifier, RandomSource, StdRandom};
pub use labels::{ConditionGroup, Label};
pub use mock::MockImageClassifier;
pub use preprocess::{decode_base64_image, NormalizedImage, PixelStats, INPUT_SIZE};
pub use remote::RemoteImageClassifier;
pub use traits::{softmax, ClassDistribution, ImageClassifier};
