//! Node-graph registration tables for the two operators.
//!
//! Declaration-only plumbing: the graph host matches these tables against the
//! traits in the rest of the crate when wiring a workflow. Slot order here is
//! the order the host presents and connects them in.

/// The slot types the two operators exchange with the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotType {
    Noise,
    Guider,
    Sampler,
    Sigmas,
    Latent,
    Vae,
    Image,
}

/// A named, typed input or output slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub name: &'static str,
    pub ty: SlotType,
}

/// One operator's registration entry.
#[derive(Debug, Clone, Copy)]
pub struct NodeDef {
    pub class_name: &'static str,
    pub display_name: &'static str,
    pub category: &'static str,
    pub inputs: &'static [Slot],
    pub outputs: &'static [Slot],
}

/// The step-capturing sampling operator.
pub const ALL_STEPS_SAMPLER: NodeDef = NodeDef {
    class_name: "AllStepsSampler",
    display_name: "Sampler (All Steps)",
    category: "sampling/custom_sampling",
    inputs: &[
        Slot {
            name: "noise",
            ty: SlotType::Noise,
        },
        Slot {
            name: "guider",
            ty: SlotType::Guider,
        },
        Slot {
            name: "sampler",
            ty: SlotType::Sampler,
        },
        Slot {
            name: "sigmas",
            ty: SlotType::Sigmas,
        },
        Slot {
            name: "latent_image",
            ty: SlotType::Latent,
        },
    ],
    outputs: &[
        Slot {
            name: "output",
            ty: SlotType::Latent,
        },
        Slot {
            name: "denoised_output",
            ty: SlotType::Latent,
        },
        Slot {
            name: "all_steps_latents",
            ty: SlotType::Latent,
        },
    ],
};

/// The batch decode operator.
pub const ALL_STEPS_DECODE: NodeDef = NodeDef {
    class_name: "AllStepsDecode",
    display_name: "Decode All Steps",
    category: "latent",
    inputs: &[
        Slot {
            name: "samples",
            ty: SlotType::Latent,
        },
        Slot {
            name: "vae",
            ty: SlotType::Vae,
        },
    ],
    outputs: &[Slot {
        name: "images",
        ty: SlotType::Image,
    }],
};

/// Everything this crate registers, in registration order.
pub const NODE_DEFS: &[NodeDef] = &[ALL_STEPS_SAMPLER, ALL_STEPS_DECODE];
