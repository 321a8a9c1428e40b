//! Instruction text handed to the agent for a work item.

use autopilot_core::WorkItemId;

use crate::detector::completion_marker;

const BRANCH_PREFIX: &str = "arihandev";
const COMMIT_EMAIL: &str = "arihanvaranasi@gmail.com";
const COMMIT_NAME: &str = "arihanv";

/// Feature branch for a work item: `arihandev/<id>-<title>`, lower-cased,
/// spaces replaced with hyphens.
pub fn branch_name(work_item: &WorkItemId, title: &str) -> String {
    format!(
        "{BRANCH_PREFIX}/{}-{}",
        work_item.as_str().to_lowercase(),
        title.to_lowercase().replace(' ', "-")
    )
}

/// Render the prompt for a work item. Pure and deterministic.
///
/// Callers pass [`WorkItem::description_or_placeholder`](autopilot_core::WorkItem::description_or_placeholder)
/// so an absent description still renders a line.
pub fn build_prompt(work_item: &WorkItemId, title: &str, description: &str) -> String {
    let branch = branch_name(work_item, title);
    let marker = completion_marker(work_item);

    format!(
        "You are executing a Linear issue autonomously. You have full permission to read, write, and edit files, and run git/bun commands.

Issue: {work_item} - {title}
Description: {description}

REQUIRED ACTIONS (execute these steps):
1. Create and checkout a feature branch: git checkout -b {branch}
2. Analyze the issue requirements and existing codebase
3. Implement the solution using the appropriate tools (Edit, Write, etc.)
4. Test your implementation if applicable (using bun test or manual testing)
5. Update changelog.md with a brief entry about your changes
6. Commit your changes: git add -A && git commit -m \"{work_item}: {title}\"
7. Push the branch: git push -u origin {branch}
8. Make a pull request to merge the branch back to the main-branch

Make a pr with:
user.email={COMMIT_EMAIL}
user.name={COMMIT_NAME}

IMPORTANT:
- You MUST actually execute these steps, not just describe them
- Use the Edit and Write tools to modify files
- Use Bash tool for git operations
- Keep changes minimal and focused

When complete, output {marker} so we know you finished."
    )
}
