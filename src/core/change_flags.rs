use std::fmt;
use std::marker::PhantomData;

/// Enum of independently trackable changes, mapped onto one bit each.
pub trait ChangeKind: Copy + fmt::Debug + 'static {
    const ALL: &'static [Self];

    fn bit(self) -> u64;
}

macro_rules! change_kinds {
    ($(#[$meta:meta])* $name:ident { $($variant:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl ChangeKind for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn bit(self) -> u64 {
                1 << (self as u32)
            }
        }
    };
}

change_kinds! {
    /// Axis attributes mirrored by the renderer-side axis cache.
    AxisChange {
        Title,
        Labels,
        Range,
        SegmentCount,
        SubSegmentCount,
        LabelFormat,
        Reversed,
        Formatter,
        LabelAutoRotation,
        TitleVisibility,
        TitleFixed,
    }
}

change_kinds! {
    /// Controller-level structural changes.
    ControllerChange {
        AxisXType,
        AxisYType,
        AxisZType,
        Theme,
        SeriesList,
        CustomItemList,
        Selection,
        SelectionMode,
        ShadowQuality,
    }
}

change_kinds! {
    /// Per-series visual attributes pulled into the series render cache.
    SeriesChange {
        Name,
        ItemLabelFormat,
        Visibility,
        Mesh,
        MeshSmooth,
        UserDefinedMesh,
        MeshRotation,
        ColorStyle,
        BaseColor,
        BaseGradient,
        SingleHighlightColor,
        SingleHighlightGradient,
        MultiHighlightColor,
        MultiHighlightGradient,
        Data,
        DrawMode,
        FlatShading,
        ItemSize,
    }
}

change_kinds! {
    /// Series attributes that can be driven by the active theme.
    ThemeAttribute {
        ColorStyle,
        BaseColor,
        BaseGradient,
        SingleHighlightColor,
        SingleHighlightGradient,
        MultiHighlightColor,
        MultiHighlightGradient,
    }
}

change_kinds! {
    /// Theme attributes propagated during a sync pass.
    ThemeChange {
        Replaced,
        ColorStyle,
        BaseColors,
        BaseGradients,
        SingleHighlightColor,
        SingleHighlightGradient,
        MultiHighlightColor,
        MultiHighlightGradient,
        Font,
        BackgroundEnabled,
        GridEnabled,
    }
}

change_kinds! {
    /// Custom item attributes pulled into the custom item render cache.
    CustomItemChange {
        Mesh,
        TextureImage,
        Position,
        Scaling,
        Rotation,
        Visibility,
        ShadowCasting,
    }
}

impl ThemeAttribute {
    /// Series change bit raised when this attribute is re-applied.
    #[must_use]
    pub const fn series_change(self) -> SeriesChange {
        match self {
            Self::ColorStyle => SeriesChange::ColorStyle,
            Self::BaseColor => SeriesChange::BaseColor,
            Self::BaseGradient => SeriesChange::BaseGradient,
            Self::SingleHighlightColor => SeriesChange::SingleHighlightColor,
            Self::SingleHighlightGradient => SeriesChange::SingleHighlightGradient,
            Self::MultiHighlightColor => SeriesChange::MultiHighlightColor,
            Self::MultiHighlightGradient => SeriesChange::MultiHighlightGradient,
        }
    }
}

/// Bitset of pending changes keyed by a [`ChangeKind`] enum.
pub struct ChangeSet<K: ChangeKind> {
    bits: u64,
    _marker: PhantomData<K>,
}

impl<K: ChangeKind> ChangeSet<K> {
    #[must_use]
    pub const fn none() -> Self {
        Self {
            bits: 0,
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub fn all() -> Self {
        let bits = K::ALL.iter().fold(0, |acc, kind| acc | kind.bit());
        Self {
            bits,
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub fn from_kind(kind: K) -> Self {
        Self {
            bits: kind.bit(),
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub fn with(mut self, kind: K) -> Self {
        self.insert(kind);
        self
    }

    pub fn insert(&mut self, kind: K) {
        self.bits |= kind.bit();
    }

    pub fn remove(&mut self, kind: K) {
        self.bits &= !kind.bit();
    }

    #[must_use]
    pub fn contains(self, kind: K) -> bool {
        (self.bits & kind.bit()) != 0
    }

    /// Returns whether `kind` was set and clears it.
    pub fn take(&mut self, kind: K) -> bool {
        let was_set = self.contains(kind);
        self.remove(kind);
        was_set
    }

    /// Returns every pending change and leaves the set empty.
    pub fn take_all(&mut self) -> Self {
        std::mem::take(self)
    }

    pub fn clear(&mut self) {
        self.bits = 0;
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self {
            bits: self.bits | other.bits,
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        (self.bits & other.bits) != 0
    }

    #[must_use]
    pub const fn is_none(self) -> bool {
        self.bits == 0
    }

    pub fn iter(self) -> impl Iterator<Item = K> {
        K::ALL.iter().copied().filter(move |kind| self.contains(*kind))
    }
}

impl<K: ChangeKind> Default for ChangeSet<K> {
    fn default() -> Self {
        Self::none()
    }
}

impl<K: ChangeKind> Clone for ChangeSet<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K: ChangeKind> Copy for ChangeSet<K> {}

impl<K: ChangeKind> PartialEq for ChangeSet<K> {
    fn eq(&self, other: &Self) -> bool {
        self.bits == other.bits
    }
}

impl<K: ChangeKind> Eq for ChangeSet<K> {}

impl<K: ChangeKind> fmt::Debug for ChangeSet<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K: ChangeKind> FromIterator<K> for ChangeSet<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        iter.into_iter().fold(Self::none(), Self::with)
    }
}
