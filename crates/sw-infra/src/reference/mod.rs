mod static_reference;

pub use static_reference::StaticReferenceData;
