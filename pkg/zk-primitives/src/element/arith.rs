use crate::Element;

impl Element {
    /// Integer addition, returning `None` on 256-bit overflow
    ///
    /// This is not field addition: amounts are balanced as integers and must never wrap.
    #[inline]
    #[must_use]
    pub fn checked_add(self, rhs: Element) -> Option<Element> {
        self.0.checked_add(rhs.0).map(Element)
    }

    /// Integer subtraction, returning `None` on underflow
    #[inline]
    #[must_use]
    pub fn checked_sub(self, rhs: Element) -> Option<Element> {
        self.0.checked_sub(rhs.0).map(Element)
    }

    /// Sum an iterator of elements, returning `None` if any partial sum overflows
    #[must_use]
    pub fn checked_sum<I: IntoIterator<Item = Element>>(iter: I) -> Option<Element> {
        iter.into_iter()
            .try_fold(Element::ZERO, Element::checked_add)
    }
}
