//! Voice assets: canonical keys and the key index

pub mod index;
pub mod normalize;

pub use index::{KeyCollision, VoiceId, VoiceIndex, VoiceLookup, VoiceRecord};
pub use normalize::{CONTAINER_MARKERS, KEY_PREFIX, descriptor_key, normalize_voice_path};
