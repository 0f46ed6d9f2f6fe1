extern crate gl_generator;

use gl_generator::{Api, Fallbacks, Profile, Registry, StructGenerator};
use std::{env, fs, path};

fn main() {
    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is set by cargo");
    let path = path::Path::new(&out_dir).join("gl_bindings.rs");
    let mut file = fs::File::create(path).expect("failed to create GL bindings file");
    Registry::new(Api::Gl, (3, 3), Profile::Core, Fallbacks::All, [])
        .write_bindings(StructGenerator, &mut file)
        .expect("failed to write GL bindings");
}
