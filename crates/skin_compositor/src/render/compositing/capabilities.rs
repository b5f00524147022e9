//! Texture slots a surface model can accept

use bitflags::bitflags;

use crate::assets::materials::Channel;

bitflags! {
    /// Capability set of a surface model
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u32 {
        /// Accepts a normal map
        const NORMAL_MAP = 1 << 0;
        /// Accepts a roughness map
        const ROUGHNESS_MAP = 1 << 1;
        /// Accepts a metalness map
        const METALNESS_MAP = 1 << 2;
        /// Accepts an ambient occlusion map
        const AMBIENT_OCCLUSION_MAP = 1 << 3;
        /// Blends a pattern over a base color
        const PAINT_BLEND = 1 << 4;
        /// Blends color slots through a mask
        const COLOR_MASK = 1 << 5;
        /// Simulates wear with wear and grunge maps
        const WEAR = 1 << 6;
        /// Accepts glitter maps
        const GLITTER = 1 << 7;

        /// Every lighting map
        const LIGHTING = Self::NORMAL_MAP.bits()
            | Self::ROUGHNESS_MAP.bits()
            | Self::METALNESS_MAP.bits()
            | Self::AMBIENT_OCCLUSION_MAP.bits();
    }
}

impl Capabilities {
    /// Capability a surface model needs before `channel` may be bound
    pub fn required_for(channel: Channel) -> Capabilities {
        match channel {
            Channel::Color | Channel::Pattern => Capabilities::PAINT_BLEND,
            Channel::Normal => Capabilities::NORMAL_MAP,
            Channel::Roughness => Capabilities::ROUGHNESS_MAP,
            Channel::Metalness => Capabilities::METALNESS_MAP,
            Channel::AmbientOcclusion => Capabilities::AMBIENT_OCCLUSION_MAP,
            Channel::Mask => Capabilities::COLOR_MASK,
            Channel::Wear | Channel::Grunge => Capabilities::WEAR,
            Channel::GlitterNormal | Channel::GlitterMask => Capabilities::GLITTER,
        }
    }

    /// True when `channel` may be bound to a model with these capabilities
    pub fn accepts(self, channel: Channel) -> bool {
        self.contains(Self::required_for(channel))
    }
}
