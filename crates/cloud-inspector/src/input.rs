//! Toolkit-neutral input events fed to the session by the windowing layer.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    A,
    D,
    W,
    S,
    Q,
    C,
    Z,
    Space,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
}

/// Pointer coordinates are viewport pixels with a top-left origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Key(Key),
    Wheel { delta_y: f64 },
    PointerPressed { x: f64, y: f64, button: PointerButton },
    PointerMoved { x: f64, y: f64, left_down: bool, shift: bool },
    Resized { width: u32, height: u32 },
}
