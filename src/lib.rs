//! Plugin host for OpenGL teaching demos.
//!
//! A [`Core`] owns a window ([`Surface`]), a frozen [`PluginRegistry`] and
//! exactly one active [`RenderPlugin`]. Plugins allocate GPU objects through
//! the [`Factory`] in their [`Context`]; the handles are reference counted
//! and deleted by the core once the plugin that owned them is gone.

#[macro_use]
extern crate log;

pub mod gl;
mod queue;

pub use egui;

pub mod buffer;
pub mod camera;
pub mod config;
pub mod context;
pub mod core;
pub mod draw_call;
pub mod error;
pub mod factory;
pub mod framebuffer;
pub mod gui;
pub mod input;
pub mod mesh;
pub mod overlay;
pub mod pipeline;
pub mod pixels;
pub mod plugin;
pub mod plugins;
pub mod program;
pub mod resources;
pub mod surface;
pub mod texture;
pub mod trackball;
pub mod window;

#[doc(inline)]
pub use crate::buffer::{Accessor, Buffer};

#[doc(inline)]
pub use crate::camera::OrbitCamera;

#[doc(inline)]
pub use crate::config::Config;

#[doc(inline)]
pub use crate::context::Context;

#[doc(inline)]
pub use crate::core::{Core, Frame};

#[doc(inline)]
pub use crate::draw_call::{DrawCall, Primitive};

#[doc(inline)]
pub use crate::error::{Error, Result};

#[doc(inline)]
pub use crate::factory::Factory;

#[doc(inline)]
pub use crate::framebuffer::{ClearOp, Framebuffer};

#[doc(inline)]
pub use crate::gui::EguiOverlay;

#[doc(inline)]
pub use crate::input::{Event, Key, KeyAction, Mods, MouseButton, MouseButtonAction};

#[doc(inline)]
pub use crate::mesh::Mesh;

#[doc(inline)]
pub use crate::overlay::{Overlay, OverlayFrame, OverlayView, Response, TitleOverlay};

#[doc(inline)]
pub use crate::pipeline::State;

#[doc(inline)]
pub use crate::pixels::Pixels;

#[doc(inline)]
pub use crate::plugin::{Plugin, PluginDescriptor, PluginRegistry, RenderPlugin};

#[doc(inline)]
pub use crate::program::{Invocation, Program, Uniform};

#[doc(inline)]
pub use crate::surface::Surface;

#[doc(inline)]
pub use crate::texture::{Sampler, Texture2};

#[doc(inline)]
pub use crate::trackball::Trackball;

#[doc(inline)]
pub use crate::window::GlWindow;
