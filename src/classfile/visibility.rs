use super::defs::access_flags;

/// Access level lattice, ordered from most to least restrictive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Visibility {
    Private,
    Package,
    Protected,
    Public,
}

impl Visibility {
    /// Decode the access bits of a class, member or inner-class entry
    pub fn from_flags(flags: u16) -> Visibility {
        if flags & access_flags::ACC_PROTECTED != 0 {
            Visibility::Protected
        } else if flags & access_flags::ACC_PUBLIC != 0 {
            Visibility::Public
        } else if flags & access_flags::ACC_PRIVATE != 0 {
            Visibility::Private
        } else {
            Visibility::Package
        }
    }

    /// Part of the public profile (public or protected)
    pub fn is_public_surface(self) -> bool {
        matches!(self, Visibility::Protected | Visibility::Public)
    }

    /// Part of any profile at all
    pub fn is_visible(self) -> bool {
        self != Visibility::Private
    }

    /// The more restrictive of the two
    pub fn merge(self, other: Visibility) -> Visibility {
        self.min(other)
    }

    /// Profile keyword; package access has none
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            Visibility::Public => Some("public"),
            Visibility::Protected => Some("protected"),
            Visibility::Private => Some("private"),
            Visibility::Package => None,
        }
    }
}
