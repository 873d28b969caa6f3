//! # 提示词构建
//!
//! 将增强设置映射为发送给生成式图像服务的自然语言指令。纯函数，无副作用。
//!
//! 科幻模式优先：开启时输出固定的风格转换指令，档位、上色、降噪参数全部忽略；
//! 两条路径互斥。

use crate::settings::EnhancementSettings;

/// 科幻模式的固定风格指令。
pub const SCI_FI_INSTRUCTION: &str = "Transform this photo into a 'Blade Runner 2049' style. \
Apply a cyberpunk aesthetic with a color palette dominated by neon purples, electric blues, and vibrant oranges. \
Add subtle effects like holographic glows, light rain reflections on surfaces, and a slightly gritty, cinematic texture. \
Ensure the key subjects of the photo remain clear and prominent within this new style.";

const COLORIZE_CLAUSE: &str = " This is a black and white photo; please colorize it realistically, \
choosing colors appropriate for the era and subject matter.";

/// 构建增强指令。
///
/// # 示例
/// ```rust
/// use neorevive::prompt::build_prompt;
/// use neorevive::settings::EnhancementSettings;
///
/// let prompt = build_prompt(&EnhancementSettings::default());
/// assert!(prompt.contains("medium"));
/// assert!(prompt.contains("50 out of 100"));
/// ```
pub fn build_prompt(settings: &EnhancementSettings) -> String {
    if settings.sci_fi_mode {
        return SCI_FI_INSTRUCTION.to_string();
    }

    let mut prompt = format!(
        "You are an expert photo restoration AI. Enhance this image by improving its resolution, clarity, and sharpness. \
Adjust the lighting and contrast to be more natural and vibrant. \
If there are any scratches, dust, or damage, meticulously remove them. \
Pay special attention to restoring fine details in faces, making them clear and recognizable without looking artificial. \
The desired level of enhancement is {}. Do not change the original composition.",
        settings.level.as_str().to_lowercase()
    );

    if settings.colorize {
        prompt.push_str(COLORIZE_CLAUSE);
    }

    prompt.push_str(&format!(
        " Apply a noise reduction level of {} out of 100, balancing noise removal with preserving image detail.",
        settings.noise_reduction
    ));

    prompt
}
