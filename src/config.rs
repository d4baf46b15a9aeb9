//! Runtime device configuration used to select among qualified values.

use std::cmp::Ordering;

use crate::locale::{self, Locale, LocaleError};

/// Generates a raw-valued qualifier enum with folder names.
macro_rules! qualifier_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident = $raw:literal => $folder:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Unknown raw values are not an error, they mean "unset".
            #[inline]
            pub const fn from_raw(raw: u32) -> Option<Self> {
                match raw {
                    $($raw => Some($name::$variant),)+
                    _ => None,
                }
            }

            #[inline]
            pub const fn raw(self) -> u32 {
                match self {
                    $($name::$variant => $raw),+
                }
            }

            /// Name used in qualifier folder strings.
            #[inline]
            pub const fn folder_name(self) -> &'static str {
                match self {
                    $($name::$variant => $folder),+
                }
            }

            pub fn from_folder_name(name: &str) -> Option<Self> {
                match name {
                    $($folder => Some($name::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

qualifier_enum! {
    /// Screen orientation.
    Direction {
        Vertical = 0 => "vertical",
        Horizontal = 1 => "horizontal",
    }
}

qualifier_enum! {
    DeviceClass {
        Phone = 0 => "phone",
        Tablet = 1 => "tablet",
        Car = 2 => "car",
        Pad = 3 => "pad",
        Tv = 4 => "tv",
        Wearable = 6 => "wearable",
    }
}

qualifier_enum! {
    /// Screen density bucket; the raw value is the bucket's DPI.
    ScreenDensity {
        Sdpi = 120 => "sdpi",
        Mdpi = 160 => "mdpi",
        Ldpi = 240 => "ldpi",
        Xldpi = 320 => "xldpi",
        Xxldpi = 480 => "xxldpi",
        Xxxldpi = 640 => "xxxldpi",
    }
}

impl ScreenDensity {
    #[inline]
    pub const fn dpi(self) -> u32 {
        self.raw()
    }
}

/// `{locale, direction, device class, screen density}`, each optional.
///
/// Equality ignores whether the script has been completed.
#[derive(Debug, Clone, Default)]
pub struct Configuration {
    locale: Option<Locale>,
    direction: Option<Direction>,
    device_class: Option<DeviceClass>,
    screen_density: Option<ScreenDensity>,
    script_completed: bool,
}

impl PartialEq for Configuration {
    fn eq(&self, other: &Self) -> bool {
        self.locale == other.locale
            && self.direction == other.direction
            && self.device_class == other.device_class
            && self.screen_density == other.screen_density
    }
}

impl Eq for Configuration {}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor for a locale-only configuration.
    pub fn with_locale(locale: Locale) -> Self {
        Self {
            locale: Some(locale),
            ..Self::default()
        }
    }

    #[inline]
    pub fn locale(&self) -> Option<&Locale> {
        self.locale.as_ref()
    }

    #[inline]
    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    #[inline]
    pub fn device_class(&self) -> Option<DeviceClass> {
        self.device_class
    }

    #[inline]
    pub fn screen_density(&self) -> Option<ScreenDensity> {
        self.screen_density
    }

    #[inline]
    pub fn is_script_completed(&self) -> bool {
        self.script_completed
    }

    /// `true` when no dimension is set (the "default" folder).
    pub fn is_default(&self) -> bool {
        self.locale.is_none()
            && self.direction.is_none()
            && self.device_class.is_none()
            && self.screen_density.is_none()
    }

    pub fn set_locale(&mut self, locale: Option<Locale>) {
        self.locale = locale;
        self.script_completed = false;
    }

    /// Validate and install a locale from parts. Language is mandatory.
    pub fn set_locale_info(
        &mut self,
        language: Option<&str>,
        script: Option<&str>,
        region: Option<&str>,
    ) -> Result<(), LocaleError> {
        let locale = Locale::from_parts(language, script, region)?;
        self.set_locale(Some(locale));
        Ok(())
    }

    pub fn set_direction(&mut self, direction: Option<Direction>) {
        self.direction = direction;
    }

    pub fn set_device_class(&mut self, device_class: Option<DeviceClass>) {
        self.device_class = device_class;
    }

    pub fn set_screen_density(&mut self, screen_density: Option<ScreenDensity>) {
        self.screen_density = screen_density;
    }

    /// Copy every dimension from `other`. The locale is replaced only if it
    /// differs and cleared when `other` has none.
    ///
    /// Returns `true` if anything changed.
    pub fn copy_from(&mut self, other: &Configuration) -> bool {
        let mut changed = false;
        if self.locale != other.locale {
            self.locale = other.locale.clone();
            self.script_completed = false;
            changed = true;
        }
        if self.direction != other.direction {
            self.direction = other.direction;
            changed = true;
        }
        if self.device_class != other.device_class {
            self.device_class = other.device_class;
            changed = true;
        }
        if self.screen_density != other.screen_density {
            self.screen_density = other.screen_density;
            changed = true;
        }
        changed
    }

    /// Fill in the likely script for language + region. Runs at most once
    /// per installed locale.
    pub fn complete_script(&mut self) {
        if self.script_completed {
            return;
        }
        self.script_completed = true;
        let Some(locale) = &self.locale else {
            return;
        };
        if locale.script().is_some() {
            return;
        }
        if let Some(script) = locale.effective_script() {
            self.locale = Some(locale.with_script(script));
        }
    }

    /// `true` when a value qualified with `self` may serve `request`.
    ///
    /// Density never excludes a candidate, it only ranks.
    pub fn matches(&self, request: &Configuration) -> bool {
        if !locale::matches(self.locale(), request.locale()) {
            return false;
        }
        if let (Some(a), Some(b)) = (self.direction, request.direction)
            && a != b
        {
            return false;
        }
        if let (Some(a), Some(b)) = (self.device_class, request.device_class)
            && a != b
        {
            return false;
        }
        true
    }

    /// Rank `self` against `other` for `request`. `Greater` means `self` wins.
    pub fn is_more_suitable(&self, other: &Configuration, request: &Configuration) -> Ordering {
        let by_locale = locale::is_more_suitable(self.locale(), other.locale(), request.locale());
        if by_locale != Ordering::Equal {
            return by_locale;
        }
        if request.direction.is_some() && self.direction != other.direction {
            return self.direction.is_some().cmp(&other.direction.is_some());
        }
        if request.device_class.is_some() && self.device_class != other.device_class {
            return self.device_class.is_some().cmp(&other.device_class.is_some());
        }
        if let Some(requested) = request.screen_density
            && self.screen_density != other.screen_density
        {
            return density_order(self.screen_density, other.screen_density, requested);
        }
        self.is_more_specific_than(other)
    }

    /// Which configuration constrains more dimensions.
    pub fn is_more_specific_than(&self, other: &Configuration) -> Ordering {
        locale::is_more_specific_than(self.locale(), other.locale())
            .then_with(|| self.direction.is_some().cmp(&other.direction.is_some()))
            .then_with(|| self.device_class.is_some().cmp(&other.device_class.is_some()))
            .then_with(|| {
                self.screen_density
                    .is_some()
                    .cmp(&other.screen_density.is_some())
            })
    }
}

/// Prefer the closest density at or above the request, then the closest below.
fn density_order(
    current: Option<ScreenDensity>,
    other: Option<ScreenDensity>,
    requested: ScreenDensity,
) -> Ordering {
    let (current, other) = match (current, other) {
        (None, None) => return Ordering::Equal,
        (Some(_), None) => return Ordering::Greater,
        (None, Some(_)) => return Ordering::Less,
        (Some(c), Some(o)) => (c.dpi(), o.dpi()),
    };
    let requested = requested.dpi();
    match (current >= requested, other >= requested) {
        (true, true) => other.cmp(&current),
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => current.cmp(&other),
    }
}
