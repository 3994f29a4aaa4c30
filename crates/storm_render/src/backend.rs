//! Graphics driver selection
//!
//! Maps a user-facing preference list (`"vulkan,gl"`) onto wgpu backend
//! flags. An empty list means "let wgpu pick".

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown graphics backend '{0}' (expected vulkan, metal, dx12, gl or webgpu)")]
pub struct UnknownBackend(pub String);

pub fn parse_backends(list: &str) -> Result<wgpu::Backends, UnknownBackend> {
    let mut backends = wgpu::Backends::empty();
    for name in list.split(',').map(str::trim).filter(|name| !name.is_empty()) {
        backends |= match name.to_ascii_lowercase().as_str() {
            "vulkan" | "vk" => wgpu::Backends::VULKAN,
            "metal" | "mtl" => wgpu::Backends::METAL,
            "dx12" | "d3d12" | "direct3d12" => wgpu::Backends::DX12,
            "gl" | "opengl" | "gles" | "opengles" => wgpu::Backends::GL,
            "webgpu" => wgpu::Backends::BROWSER_WEBGPU,
            "all" => wgpu::Backends::all(),
            _ => return Err(UnknownBackend(name.to_string())),
        };
    }

    if backends.is_empty() {
        Ok(wgpu::Backends::all())
    } else {
        Ok(backends)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_and_lists() {
        assert_eq!(parse_backends("vulkan"), Ok(wgpu::Backends::VULKAN));
        assert_eq!(
            parse_backends(" Vulkan , gl "),
            Ok(wgpu::Backends::VULKAN | wgpu::Backends::GL)
        );
        assert_eq!(parse_backends("direct3d12"), Ok(wgpu::Backends::DX12));
    }

    #[test]
    fn test_empty_means_all() {
        assert_eq!(parse_backends(""), Ok(wgpu::Backends::all()));
        assert_eq!(parse_backends(" , "), Ok(wgpu::Backends::all()));
    }

    #[test]
    fn test_unknown_name() {
        assert_eq!(parse_backends("gl,glide"), Err(UnknownBackend("glide".to_string())));
    }
}
