//! Prompt templates for the detector and the redactor.
//!
//! These strings are the whole control surface over the external models:
//! nothing guarantees that a generation model limits its edits to the listed
//! regions, so redacted output is treated as best-effort downstream.

use std::fmt::Write;

use crate::models::detection::BoundingBox;
use crate::models::image::ImageDimensions;
use crate::models::redaction::{RedactionPlan, RedactionStyle, Treatment};
use crate::policy::IdPrefixPolicy;

/// System and user text for a detection call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionPrompt {
    pub system: String,
    pub user: String,
}

/// Instruction sent alongside the original image to the redactor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedactionPrompt {
    pub text: String,
}

const DETECTION_SYSTEM_PROMPT: &str = "\
You are a highly specialized data protection officer with expertise in Optical \
Character Recognition (OCR) and Personally Identifiable Information (PII) \
detection from document images, including identity cards. \
You answer only with JSON that matches the requested shape.";

pub fn detection_prompt(dimensions: ImageDimensions, policy: &IdPrefixPolicy) -> DetectionPrompt {
    let ImageDimensions { width, height } = dimensions;
    let prefix = policy.prefix_digits;

    let user = format!(
        "\
Meticulously analyze the attached document image and identify the following PII types:
- Name
- Date of Birth (or Year of Birth)
- Gender
- National ID Number (for example an Aadhaar number)
- Photo (the main portrait of the person)
- Email
- Phone
- Address

For each piece of PII you find:
1. Extract the exact text value.
2. Identify its type from the list above. Use a short descriptive label for anything else that identifies a person.
3. Determine the bounding box (x1, y1, x2, y2) that encloses the PII, in pixels of the original image. \
The image is {width} pixels wide and {height} pixels tall; (0, 0) is the top-left corner, x1 < x2 and y1 < y2. \
Omit bounding_box if you cannot localize the PII.

CRITICAL INSTRUCTIONS for specific fields:
- National ID Number: report ONLY THE FIRST {prefix} DIGITS as the PII to be redacted. \
The 'value' MUST contain only those {prefix} digits and the 'bounding_box' MUST cover only the area of those digits. \
The remaining digits are not sensitive and must be excluded.
- Photo: the 'value' is \"face\". The 'bounding_box' must enclose the entire photo area.

Return a JSON object of the form
{{\"piiElements\": [{{\"type\": \"Name\", \"value\": \"...\", \"bounding_box\": {{\"x1\": 0, \"y1\": 0, \"x2\": 0, \"y2\": 0}}}}]}}
If no PII is found, return {{\"piiElements\": []}}."
    );

    DetectionPrompt {
        system: DETECTION_SYSTEM_PROMPT.to_string(),
        user,
    }
}

/// Build the redactor instruction for a plan. Returns `None` for an empty
/// plan, in which case the redactor must not be called.
pub fn redaction_prompt(plan: &RedactionPlan) -> Option<RedactionPrompt> {
    if plan.is_empty() {
        return None;
    }

    let text = match plan.style {
        RedactionStyle::Mask => mask_prompt(plan),
        RedactionStyle::Redact => redact_prompt(plan),
    };

    Some(RedactionPrompt { text })
}

fn bbox_string(b: &BoundingBox) -> String {
    format!(
        "(x1: {:.0}, y1: {:.0}, x2: {:.0}, y2: {:.0})",
        b.x1, b.y1, b.x2, b.y2
    )
}

fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "'"))
}

fn mask_prompt(plan: &RedactionPlan) -> String {
    let mut regions = String::new();
    for item in &plan.items {
        let _ = writeln!(
            regions,
            "- A {} located at bounding box {}.",
            item.category,
            bbox_string(&item.bounding_box)
        );
    }

    format!(
        "\
You are an expert image editor specializing in high-fidelity document redaction.
Your task is to edit the provided image to mask specific areas containing Personally Identifiable Information (PII).

**Instructions:**
1. Analyze the provided image.
2. Cover the areas defined by the following bounding box coordinates with solid, opaque, black rectangles.
3. Do NOT alter any other part of the image. The final image must be a high-quality copy of the original with only the specified areas redacted.
4. Do not add any text, watermarks, or other artifacts. The redaction must be clean and precise.

**PII to redact:**
{regions}"
    )
}

fn redact_prompt(plan: &RedactionPlan) -> String {
    let mut fills = Vec::new();
    let mut blurs = Vec::new();
    let mut replacements = Vec::new();
    let mut keeps_id_tail = false;

    for item in &plan.items {
        let bbox = bbox_string(&item.bounding_box);
        match &item.treatment {
            Treatment::OpaqueFill => fills.push(format!(
                "- Cover the {} within bounding box {bbox} with a solid, opaque, black rectangle.",
                item.category
            )),
            Treatment::Blur { radius_px } => blurs.push(format!(
                "- Apply a Gaussian blur (strength: {radius_px}px) to the area within bounding box {bbox}."
            )),
            Treatment::Placeholder {
                original,
                replacement,
                prefix_only,
            } => {
                if *prefix_only {
                    keeps_id_tail = true;
                    replacements.push(format!(
                        "- Replace the text {} (the leading digits of the {}) inside {bbox} with {}. \
                         The digits that follow must remain untouched.",
                        quoted(original),
                        item.category,
                        quoted(replacement)
                    ));
                } else {
                    replacements.push(format!(
                        "- Replace the text {} inside {bbox} with {}.",
                        quoted(original),
                        quoted(replacement)
                    ));
                }
            }
        }
    }

    let mut prompt = String::from(
        "\
You are an expert document recreation specialist. Your task is to create a visually faithful, high-fidelity \
replica of the provided document image with specific modifications. You must not alter any part of the image \
except for the specific instructions below. The final image must have the same dimensions, quality, and \
background as the original.

**MODIFICATION INSTRUCTIONS:**
",
    );

    let mut step = 1;
    if !blurs.is_empty() {
        let _ = write!(prompt, "\n{step}. **Blur Photo:**\n{}\n", blurs.join("\n"));
        step += 1;
    }
    if !fills.is_empty() {
        let _ = write!(prompt, "\n{step}. **Cover Regions:**\n{}\n", fills.join("\n"));
        step += 1;
    }
    if !replacements.is_empty() {
        let _ = write!(
            prompt,
            "\n{step}. **Replace Text with Placeholders:**
For each item below, find the original text inside its bounding box and replace it with the placeholder text. \
Each placeholder has the same number of characters and the same spacing as the text it replaces. \
You MUST use the following styling for the placeholder text:
- **Font Family**: 'Inter', 'Arial', sans-serif (a clean, neutral sans-serif font).
- **Font Weight**: 600 (semi-bold).
- **Font Size**: exactly match the font size of the original text being replaced.
- **Color**: #222222 (a dark, neutral grey).
- **Letter Spacing**: 0.5px.
- **Text Transform**: Uppercase.
- **Alignment**: Left-aligned to the original text's starting position.

**Text to Replace:**
{}
",
            replacements.join("\n")
        );
    }

    prompt.push_str(
        "
**CRITICAL RULES:**
- Do not draw boxes or borders around the replaced text.
- The 'Gender' field should remain unchanged.
",
    );
    if keeps_id_tail {
        prompt.push_str(
            "- Only the leading digits of an ID number are replaced; its remaining digits must remain visible and untouched.\n",
        );
    }
    prompt.push_str(
        "- All other text, logos, and design elements of the original document must be preserved exactly.\n",
    );

    prompt
}
