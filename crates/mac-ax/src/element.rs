use std::{ffi::c_void, fmt, sync::Arc};

use core_graphics::geometry::CGPoint;
use notimove_core::{AxError, Element, ElementRef, Point, Size};

use crate::{
    ax::{
        AX_CHILDREN, AX_IDENTIFIER, AX_POSITION, AX_ROLE, AX_SIZE, AX_SUBROLE, AXElem, ax_elements,
        ax_get_point, ax_get_size, ax_get_string, ax_is_settable, ax_set_point, cfstr,
    },
    screen::{flip_y, primary_height},
};

/// A live AX element, exposed to the core in bottom-left coordinates.
pub struct AxElement {
    elem: AXElem,
    /// Primary display height captured when the tree was entered.
    pivot: f64,
}

impl fmt::Debug for AxElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AxElement")
            .field("ptr", &self.elem.as_ptr())
            .finish()
    }
}

impl AxElement {
    pub(crate) fn new(elem: AXElem) -> Self {
        Self {
            elem,
            pivot: primary_height(),
        }
    }

    fn child(&self, elem: AXElem) -> ElementRef {
        Arc::new(Self {
            elem,
            pivot: self.pivot,
        })
    }

    pub(crate) fn as_ptr(&self) -> *mut c_void {
        self.elem.as_ptr()
    }
}

impl Element for AxElement {
    fn role(&self) -> Option<String> {
        ax_get_string(self.as_ptr(), cfstr(AX_ROLE))
    }

    fn subrole(&self) -> Option<String> {
        ax_get_string(self.as_ptr(), cfstr(AX_SUBROLE))
    }

    fn identifier(&self) -> Option<String> {
        ax_get_string(self.as_ptr(), cfstr(AX_IDENTIFIER))
    }

    fn children(&self) -> Vec<ElementRef> {
        ax_elements(self.as_ptr(), cfstr(AX_CHILDREN))
            .into_iter()
            .map(|e| self.child(e))
            .collect()
    }

    fn position(&self) -> Result<Point, AxError> {
        let p = ax_get_point(self.as_ptr(), cfstr(AX_POSITION))?;
        let s = self.size()?;
        Ok(Point::new(p.x, flip_y(p.y, s.height, self.pivot)))
    }

    fn size(&self) -> Result<Size, AxError> {
        let s = ax_get_size(self.as_ptr(), cfstr(AX_SIZE))?;
        Ok(Size::new(s.width, s.height))
    }

    fn position_settable(&self) -> Result<bool, AxError> {
        ax_is_settable(self.as_ptr(), cfstr(AX_POSITION))
    }

    fn set_position(&self, pos: Point) -> Result<(), AxError> {
        let s = self.size()?;
        let top_left = CGPoint::new(pos.x, flip_y(pos.y, s.height, self.pivot));
        ax_set_point(self.as_ptr(), cfstr(AX_POSITION), top_left)
    }
}
