//===========================================================================//

/// The type of resource named in an ICONDIR header.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum ResourceType {
    /// Plain images (ICO files)
    Icon,
    /// Images with cursor hotspots (CUR files).  These are never decoded as
    /// icons; their bytes are handed to the generic raster fallback instead.
    Cursor,
}

impl ResourceType {
    pub(crate) fn from_number(number: u16) -> Option<ResourceType> {
        match number {
            1 => Some(ResourceType::Icon),
            2 => Some(ResourceType::Cursor),
            _ => None,
        }
    }
}

//===========================================================================//


//===========================================================================//
