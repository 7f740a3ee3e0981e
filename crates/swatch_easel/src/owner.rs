//! Owners of a style map.

use std::borrow::Cow;

use swatch_carton::StyleMap;

/// A component or controller that may carry a compiled [`StyleMap`].
///
/// `styles` returning `None` means no stylesheet is attached.
pub trait StyleOwner {
    fn styles(&self) -> Option<&StyleMap>;

    /// Name used in diagnostics.
    fn owner_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(std::any::type_name::<Self>())
    }
}

impl<T: StyleOwner + ?Sized> StyleOwner for Box<T> {
    fn styles(&self) -> Option<&StyleMap> {
        (**self).styles()
    }

    fn owner_name(&self) -> Cow<'_, str> {
        (**self).owner_name()
    }
}

/// Borrowed owner for callers that hold a name and an optional map rather
/// than a typed component.
#[derive(Debug, Clone, Copy)]
pub struct OwnerRef<'a> {
    name: &'a str,
    styles: Option<&'a StyleMap>,
}

impl<'a> OwnerRef<'a> {
    pub fn new(name: &'a str, styles: &'a StyleMap) -> Self {
        Self {
            name,
            styles: Some(styles),
        }
    }

    /// An owner with no stylesheet attached.
    pub fn unstyled(name: &'a str) -> Self {
        Self { name, styles: None }
    }
}

impl StyleOwner for OwnerRef<'_> {
    fn styles(&self) -> Option<&StyleMap> {
        self.styles
    }

    fn owner_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;

    impl StyleOwner for Plain {
        fn styles(&self) -> Option<&StyleMap> {
            None
        }
    }

    #[test]
    fn test_default_owner_name_is_type_name() {
        assert!(Plain.owner_name().ends_with("Plain"));
    }

    #[test]
    fn test_boxed_owner_delegates() {
        let styles: StyleMap = [("a", "x")].into_iter().collect();
        let owner: Box<OwnerRef<'_>> = Box::new(OwnerRef::new("my-widget", &styles));
        assert_eq!(owner.owner_name(), "my-widget");
        assert_eq!(owner.styles().and_then(|s| s.get("a")), Some("x"));
    }
}
